//! # fleetdesk-core
//!
//! Core crate for FleetDesk. Contains the list-query model shared by every
//! resource (filters, sorting, pagination, ownership scope), configuration
//! schemas, the cache/storage/repository traits, text helpers, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other FleetDesk crates.

pub mod config;
pub mod error;
pub mod result;
pub mod text;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
