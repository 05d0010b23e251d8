//! # fleetdesk-database
//!
//! Repository traits for every FleetDesk resource, with two backends:
//! PostgreSQL (via `sqlx`) for production and an in-memory store for local
//! development and tests. Both render the same backend-neutral
//! [`ListQuery`](fleetdesk_core::types::ListQuery).

pub mod connection;
pub mod memory;
pub mod query;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::MemoryDatabase;
pub use repositories::Repositories;
