//! Blog content entities: posts, categories, and tags.

pub mod category;
pub mod filter;
pub mod post;
pub mod status;
pub mod tag;

pub use category::{BlogCategory, BlogCategoryInput};
pub use filter::{BlogCategoryFilter, BlogPostFilter, BlogTagFilter};
pub use post::{BlogPost, BlogPostData, BlogPostInput};
pub use status::PostStatus;
pub use tag::{BlogTag, BlogTagInput};
