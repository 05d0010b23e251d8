//! # fleetdesk-auth
//!
//! Authorization for the FleetDesk back office. Sessions are issued by the
//! external identity provider; this crate only verifies its bearer tokens
//! and decides what the caller may do.
//!
//! ## Modules
//!
//! - `jwt`: HS256 claims, verification, and minting (tests and tooling)
//! - `context`: the per-request caller identity passed into every service call
//! - `rbac`: role to permission policies and their enforcement

pub mod context;
pub mod jwt;
pub mod rbac;

pub use context::{RequestContext, UserRole};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use rbac::{RbacEnforcer, RbacPolicies, SystemPermission};
