//! # fleetdesk-service
//!
//! Back-office use cases for FleetDesk. Every mutating method takes an
//! explicit [`RequestContext`], checks it through the RBAC enforcer and the
//! row-ownership scope before writing, and revalidates the cached pages that
//! could show the changed rows.
//!
//! Services follow constructor injection: repositories, the page cache, and
//! media storage are handed in as shared handles. [`Services`] wires them all.

pub mod blog;
pub mod booking;
pub mod currency;
pub mod media;
pub mod paths;
pub mod pricing;
pub mod review;
pub mod route;
pub mod vehicle;

mod container;
mod support;
#[cfg(test)]
mod testing;

pub use blog::{BlogCategoryService, BlogPostService, BlogTagService};
pub use booking::{BookingService, ExportSelection};
pub use container::Services;
pub use currency::CurrencyService;
pub use media::MediaService;
pub use pricing::{FormOptions, PricingService};
pub use review::ReviewService;
pub use route::RouteService;
pub use vehicle::VehicleService;

pub use fleetdesk_auth::RequestContext;
