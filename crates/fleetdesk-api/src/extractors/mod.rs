//! Custom Axum extractors.
//!
//! Each one turns axum's own rejection into an [`ApiError`](crate::error::ApiError)
//! so clients always receive the standard error body.

pub mod auth;
pub mod json;
pub mod path;
pub mod query;

pub use auth::AuthUser;
pub use json::ValidatedJson;
pub use path::IdPath;
pub use query::QueryParams;
