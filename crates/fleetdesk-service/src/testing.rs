//! Fixtures for service tests: in-memory repositories, an in-memory page
//! cache, and media written to a temporary directory.

use std::sync::Arc;

use tempfile::TempDir;
use uuid::Uuid;

use fleetdesk_auth::{RbacEnforcer, RequestContext};
use fleetdesk_cache::{CacheManager, Revalidator};
use fleetdesk_core::config::StorageConfig;
use fleetdesk_database::{MemoryDatabase, Repositories};
use fleetdesk_storage::MediaStore;
use fleetdesk_storage::providers::LocalStorageProvider;

use crate::container::Services;

pub(crate) struct Fixture {
    pub db: Arc<MemoryDatabase>,
    pub services: Services,
    pub admin: RequestContext,
    _media_root: TempDir,
}

impl Fixture {
    /// Builds services over a fresh in-memory database.
    pub async fn new() -> Self {
        let db = Arc::new(MemoryDatabase::new());
        let media_root = tempfile::tempdir().unwrap();
        let provider = Arc::new(LocalStorageProvider::new(media_root.path()).await.unwrap());
        let media = MediaStore::new(provider, &StorageConfig::default());
        let pages = Revalidator::new(CacheManager::in_memory());
        let services = Services::new(
            Repositories::memory(db.clone()),
            pages,
            media,
            Arc::new(RbacEnforcer::new()),
        );
        Self {
            db,
            services,
            admin: RequestContext::admin(Uuid::new_v4()),
            _media_root: media_root,
        }
    }

    /// A vendor context for a freshly seeded business.
    pub fn vendor(&self, name: &str) -> RequestContext {
        let business_id = self.db.add_business(name);
        RequestContext::vendor(Uuid::new_v4(), business_id)
    }
}
