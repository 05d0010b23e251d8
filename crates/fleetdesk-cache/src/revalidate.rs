//! Cached page reads and path/tag eviction.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use fleetdesk_core::result::AppResult;
use fleetdesk_core::traits::cache::CacheProvider;

use crate::keys;
use crate::provider::CacheManager;

/// Default cap on the keys indexed under one tag.
pub const DEFAULT_TAG_LIMIT: usize = 10_000;

/// Reads pages through the cache and evicts them after mutations.
///
/// Cache failures never fail a request: a read falls through to the loader
/// and an eviction failure is logged. Tags index cache keys in process, so a
/// tag eviction only reaches pages this instance cached; path eviction is a
/// provider-side prefix delete and reaches every instance sharing Redis.
///
/// The tag index is bounded. Path eviction drops the keys it removed, and a
/// page that would push a tag past its limit is not kept in the cache.
#[derive(Debug, Clone)]
pub struct Revalidator {
    cache: CacheManager,
    tags: Arc<DashMap<String, HashSet<String>>>,
    tag_limit: usize,
}

impl Revalidator {
    /// Wrap a cache manager.
    pub fn new(cache: CacheManager) -> Self {
        Self {
            cache,
            tags: Arc::new(DashMap::new()),
            tag_limit: DEFAULT_TAG_LIMIT,
        }
    }

    /// Override the per-tag key limit.
    pub fn with_tag_limit(mut self, limit: usize) -> Self {
        self.tag_limit = limit.max(1);
        self
    }

    /// Number of cache keys currently held in the tag index.
    pub fn tagged_keys(&self) -> usize {
        self.tags.iter().map(|entry| entry.value().len()).sum()
    }

    /// The underlying cache.
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Return the cached page for `path` and `query`, or load and store it.
    pub async fn cached<T, Q, F, Fut>(
        &self,
        path: &str,
        query: &Q,
        tags: &[&str],
        load: F,
    ) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        Q: Serialize + Sync + ?Sized,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
    {
        let key = match keys::fingerprint(query) {
            Ok(fingerprint) => keys::page(path, &fingerprint),
            Err(e) => {
                warn!(path, error = %e, "Unable to fingerprint query, bypassing cache");
                return load().await;
            }
        };

        match self.cache.get(&key).await {
            Ok(Some(hit)) => match serde_json::from_str(&hit) {
                Ok(page) => {
                    debug!(key = %key, "Page cache hit");
                    return Ok(page);
                }
                Err(e) => warn!(key = %key, error = %e, "Discarding unreadable cached page"),
            },
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Page cache read failed"),
        }

        let page = load().await?;
        match serde_json::to_string(&page) {
            Ok(json) => {
                if let Err(e) = self.cache.put(&key, &json, None).await {
                    warn!(key = %key, error = %e, "Page cache write failed");
                } else if !tags.iter().all(|tag| self.tag(tag, &key)) {
                    // A page missing from a tag's index could outlive a tag eviction.
                    debug!(key = %key, "Tag index full, not caching page");
                    if let Err(e) = self.cache.evict(&key).await {
                        warn!(key = %key, error = %e, "Failed to drop untagged page");
                    }
                }
            }
            Err(e) => warn!(key = %key, error = %e, "Unable to serialize page"),
        }
        Ok(page)
    }

    /// Associate a cache key with a tag. Returns `false` when the tag is full.
    pub fn tag(&self, tag: &str, key: &str) -> bool {
        let mut keys = self.tags.entry(tag.to_string()).or_default();
        if keys.len() >= self.tag_limit && !keys.contains(key) {
            return false;
        }
        keys.insert(key.to_string());
        true
    }

    fn forget_prefix(&self, prefix: &str) {
        self.tags.retain(|_, keys| {
            keys.retain(|key| !key.starts_with(prefix));
            !keys.is_empty()
        });
    }

    /// Evict every cached page under each of `paths`. Returns the number of keys removed.
    pub async fn revalidate_paths(&self, paths: &[&str]) -> u64 {
        let mut removed = 0;
        for path in paths {
            let prefix = keys::page_prefix(path);
            match self.cache.evict_prefix(&prefix).await {
                Ok(n) => {
                    removed += n;
                    self.forget_prefix(&prefix);
                }
                Err(e) => warn!(path, error = %e, "Failed to revalidate path"),
            }
        }
        debug!(?paths, removed, "Revalidated paths");
        removed
    }

    /// Evict every page registered under `tag`.
    pub async fn revalidate_tag(&self, tag: &str) -> u64 {
        let Some((_, keys)) = self.tags.remove(tag) else {
            return 0;
        };
        let mut removed = 0;
        for key in keys {
            match self.cache.evict(&key).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => warn!(tag, key = %key, error = %e, "Failed to evict tagged page"),
            }
        }
        debug!(tag, removed, "Revalidated tag");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use fleetdesk_core::error::AppError;

    async fn load_counted(calls: &AtomicU32, value: u32) -> AppResult<u32> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let revalidator = Revalidator::new(CacheManager::in_memory());
        let calls = AtomicU32::new(0);

        let first: u32 = revalidator
            .cached("/admin/blog", &("page", 1), &[], || load_counted(&calls, 7))
            .await
            .unwrap();
        let second: u32 = revalidator
            .cached("/admin/blog", &("page", 1), &[], || load_counted(&calls, 8))
            .await
            .unwrap();

        assert_eq!((first, second), (7, 7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_path_revalidation_forces_reload() {
        let revalidator = Revalidator::new(CacheManager::in_memory());
        let calls = AtomicU32::new(0);

        revalidator
            .cached("/admin/blog", &1, &[], || load_counted(&calls, 1))
            .await
            .unwrap();
        revalidator
            .cached("/admin/reviews", &1, &[], || load_counted(&calls, 1))
            .await
            .unwrap();

        assert_eq!(revalidator.revalidate_paths(&["/admin/blog"]).await, 1);

        let reloaded: u32 = revalidator
            .cached("/admin/blog", &1, &[], || load_counted(&calls, 2))
            .await
            .unwrap();
        assert_eq!(reloaded, 2);
    }

    #[tokio::test]
    async fn test_tag_revalidation() {
        let revalidator = Revalidator::new(CacheManager::in_memory());
        let calls = AtomicU32::new(0);

        revalidator
            .cached("/blog", &"a", &["blog-posts"], || load_counted(&calls, 1))
            .await
            .unwrap();
        revalidator
            .cached("/blog/hello", &"b", &["blog-posts"], || load_counted(&calls, 1))
            .await
            .unwrap();

        assert_eq!(revalidator.revalidate_tag("blog-posts").await, 2);
        assert_eq!(revalidator.revalidate_tag("blog-posts").await, 0);
    }

    #[tokio::test]
    async fn test_path_eviction_prunes_tag_index() {
        let revalidator = Revalidator::new(CacheManager::in_memory());
        let calls = AtomicU32::new(0);

        for n in 0..50u32 {
            revalidator
                .cached("/blog", &n, &["blog-categories"], || load_counted(&calls, n))
                .await
                .unwrap();
        }
        revalidator
            .cached("/reviews", &0, &["blog-categories"], || load_counted(&calls, 0))
            .await
            .unwrap();
        assert_eq!(revalidator.tagged_keys(), 51);

        revalidator.revalidate_paths(&["/blog"]).await;
        assert_eq!(revalidator.tagged_keys(), 1);
        assert_eq!(revalidator.revalidate_tag("blog-categories").await, 1);
        assert_eq!(revalidator.tagged_keys(), 0);
    }

    #[tokio::test]
    async fn test_full_tag_skips_caching() {
        let revalidator = Revalidator::new(CacheManager::in_memory()).with_tag_limit(2);
        let calls = AtomicU32::new(0);

        for n in 0..3u32 {
            revalidator
                .cached("/blog", &n, &["blog-tags"], || load_counted(&calls, n))
                .await
                .unwrap();
        }
        assert_eq!(revalidator.tagged_keys(), 2);

        let again: u32 = revalidator
            .cached("/blog", &2u32, &["blog-tags"], || load_counted(&calls, 2))
            .await
            .unwrap();
        assert_eq!(again, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_loader_errors_are_not_cached() {
        let revalidator = Revalidator::new(CacheManager::in_memory());
        let failed: AppResult<u32> = revalidator
            .cached("/admin/bookings", &0, &[], || async {
                Err(AppError::internal("boom"))
            })
            .await;
        assert!(failed.is_err());

        let ok: u32 = revalidator
            .cached("/admin/bookings", &0, &[], || async { Ok(3) })
            .await
            .unwrap();
        assert_eq!(ok, 3);
    }
}
