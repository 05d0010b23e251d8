//! Blog content: posts, categories, and tags.

pub mod category;
pub mod post;
pub mod tag;

pub use category::BlogCategoryService;
pub use post::BlogPostService;
pub use tag::BlogTagService;
