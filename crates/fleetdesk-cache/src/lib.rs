//! # fleetdesk-cache
//!
//! Page cache for FleetDesk list and public endpoints. Two providers:
//!
//! - **memory**: in-process cache using [moka](https://crates.io/crates/moka)
//! - **redis**: shared cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime from configuration. Every successful
//! mutation goes through [`Revalidator`], which evicts cached pages by path
//! prefix and by tag.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod revalidate;

pub use provider::CacheManager;
pub use revalidate::Revalidator;
