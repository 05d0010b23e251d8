//! Core type definitions used across the FleetDesk workspace.

pub mod filter;
pub mod pagination;
pub mod params;
pub mod query;
pub mod scope;
pub mod selection;
pub mod sorting;

pub use filter::{FilterField, FilterOp, FilterValue};
pub use pagination::{PageRequest, PageResponse};
pub use params::ListParams;
pub use query::{ListFilter, ListQuery, Search};
pub use scope::OwnerScope;
pub use selection::{BulkIds, BulkSelection};
pub use sorting::{SortDirection, SortField};
