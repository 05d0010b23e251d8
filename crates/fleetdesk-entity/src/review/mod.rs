//! Customer review entities.

pub mod filter;
pub mod model;

pub use filter::ReviewFilter;
pub use model::{Review, ReviewResponseInput, ReviewStatus};
