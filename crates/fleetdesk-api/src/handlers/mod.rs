//! Request handlers, one module per resource.
//!
//! Admin and vendor routes share handlers: the caller's
//! [`RequestContext`](fleetdesk_auth::RequestContext) decides which rows a
//! service exposes.

pub mod blog;
pub mod bookings;
pub mod currencies;
pub mod health;
pub mod media;
pub mod pricing;
pub mod reviews;
pub mod routes;
pub mod vehicles;
