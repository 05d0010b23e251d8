//! Core traits defined in `fleetdesk-core` and implemented by other crates.

pub mod cache;
pub mod repository;
pub mod storage;

pub use cache::CacheProvider;
pub use repository::ListRepository;
pub use storage::StorageProvider;
