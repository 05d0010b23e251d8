//! Page cache backend trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// A string-valued cache with prefix eviction (Redis or in-memory).
///
/// Values are serialized pages. Implementations own key namespacing and
/// expiry.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Read a value. Expired keys read as `None`.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store a value. `None` applies the provider's default TTL.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// Remove one key. Returns whether it was present.
    async fn evict(&self, key: &str) -> AppResult<bool>;

    /// Remove every key starting with `prefix`. Returns the number removed.
    async fn evict_prefix(&self, prefix: &str) -> AppResult<u64>;

    /// Fail when the backend is unreachable.
    async fn ping(&self) -> AppResult<()>;
}
