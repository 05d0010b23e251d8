//! Generic list/read repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;
use crate::types::pagination::PageResponse;
use crate::types::query::ListQuery;
use crate::types::scope::OwnerScope;

/// The read side every resource repository shares.
///
/// Resource-specific writes are declared on per-resource traits that extend
/// this one, so a service holding `Arc<dyn BookingRepository>` can still call
/// [`ListRepository::list`].
#[async_trait]
pub trait ListRepository<Entity>: Send + Sync + 'static
where
    Entity: Send + Sync + 'static,
{
    /// Run a filtered, sorted, paginated list query within `scope`.
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<Entity>>;

    /// Find a single row by id within `scope`.
    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Entity>>;
}
