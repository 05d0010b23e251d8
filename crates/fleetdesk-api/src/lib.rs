//! # fleetdesk-api
//!
//! HTTP API layer for FleetDesk built on Axum.
//!
//! Three surfaces share one router: `/api/admin` for platform staff,
//! `/api/vendor` for transport businesses (every row scoped to the caller's
//! business), and `/api/public` for the read-only data the booking site
//! renders. Handlers are thin: they parse query strings into typed filters,
//! hand the caller's [`RequestContext`](fleetdesk_auth::RequestContext) to a
//! service, and wrap the result in [`ApiResponse`](dto::response::ApiResponse).

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
