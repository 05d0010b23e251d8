//! Transfer route entities.

pub mod filter;
pub mod model;

pub use filter::RouteFilter;
pub use model::{CreatorType, Route, RouteInput};
