//! Review repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use fleetdesk_core::result::AppResult;
use fleetdesk_core::traits::ListRepository;
use fleetdesk_core::types::{BulkIds, FilterValue, ListQuery, OwnerScope, PageResponse};
use fleetdesk_entity::review::{Review, ReviewStatus};

use crate::memory::table::paginate;
use crate::memory::{MemoryDatabase, Record};
use crate::query::{self, Table};

/// Review moderation.
#[async_trait]
pub trait ReviewRepository: ListRepository<Review> {
    /// Approve or reject a review.
    async fn set_status(&self, id: Uuid, status: ReviewStatus) -> AppResult<Option<Review>>;

    /// Approve or reject many reviews.
    async fn bulk_set_status(&self, ids: &BulkIds, status: ReviewStatus) -> AppResult<u64>;

    /// Record a public reply, its author, and the time.
    async fn respond(
        &self,
        id: Uuid,
        response: &str,
        responder: Uuid,
    ) -> AppResult<Option<Review>>;

    /// Flip `is_featured`.
    async fn toggle_featured(&self, id: Uuid) -> AppResult<Option<Review>>;

    /// Delete one review.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Delete many reviews.
    async fn bulk_delete(&self, ids: &BulkIds) -> AppResult<u64>;
}

pub(crate) const REVIEWS: Table = Table {
    name: "reviews",
    alias: "r",
    columns: "r.*, cu.full_name AS customer_name",
    from: "FROM reviews r LEFT JOIN customers cu ON cu.id = r.customer_id",
    fields: &[
        ("id", "r.id"),
        ("review_text", "r.review_text"),
        ("title", "r.title"),
        ("customer_name", "cu.full_name"),
        ("status", "r.status::text"),
        ("rating", "r.rating"),
        ("is_featured", "r.is_featured"),
        ("created_at", "r.created_at"),
    ],
    owner: None,
};

/// PostgreSQL implementation.
#[derive(Debug, Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    /// Create a new review repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn refetch(&self, updated: Option<Uuid>) -> AppResult<Option<Review>> {
        match updated {
            Some(id) => query::fetch_existing(&self.pool, &REVIEWS, id).await.map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ListRepository<Review> for PgReviewRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<Review>> {
        query::fetch_page(&self.pool, &REVIEWS, query, scope).await
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Review>> {
        query::fetch_by_id(&self.pool, &REVIEWS, id, scope).await
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn set_status(&self, id: Uuid, status: ReviewStatus) -> AppResult<Option<Review>> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            "UPDATE reviews SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query::write_error(&REVIEWS, e))?;
        self.refetch(updated).await
    }

    async fn bulk_set_status(&self, ids: &BulkIds, status: ReviewStatus) -> AppResult<u64> {
        sqlx::query("UPDATE reviews SET status = $2, updated_at = NOW() WHERE id = ANY($1)")
            .bind(ids.as_slice())
            .bind(status)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| query::write_error(&REVIEWS, e))
    }

    async fn respond(
        &self,
        id: Uuid,
        response: &str,
        responder: Uuid,
    ) -> AppResult<Option<Review>> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            "UPDATE reviews SET admin_response = $2, responded_by = $3, responded_at = NOW(), \
             updated_at = NOW() WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(response)
        .bind(responder)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query::write_error(&REVIEWS, e))?;
        self.refetch(updated).await
    }

    async fn toggle_featured(&self, id: Uuid) -> AppResult<Option<Review>> {
        if !query::toggle(&self.pool, &REVIEWS, id, "is_featured", OwnerScope::All).await? {
            return Ok(None);
        }
        query::fetch_by_id(&self.pool, &REVIEWS, id, OwnerScope::All).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        query::delete_one(&self.pool, &REVIEWS, id, OwnerScope::All).await
    }

    async fn bulk_delete(&self, ids: &BulkIds) -> AppResult<u64> {
        query::delete_many(&self.pool, &REVIEWS, ids.as_slice(), OwnerScope::All).await
    }
}

impl Record for Review {
    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        Some(match name {
            "id" => self.id.into(),
            "review_text" => self.review_text.as_str().into(),
            "title" => self.title.clone().into(),
            "customer_name" => self.customer_name.clone().into(),
            "status" => self.status.as_str().into(),
            "rating" => self.rating.into(),
            "is_featured" => self.is_featured.into(),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// In-memory implementation.
#[derive(Debug, Clone)]
pub struct MemoryReviewRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryReviewRepository {
    /// Create a repository over the shared in-memory tables.
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }

    fn joined(&self, mut review: Review) -> Review {
        review.customer_name = self.db.customer(review.customer_id).map(|c| c.full_name);
        review
    }
}

#[async_trait]
impl ListRepository<Review> for MemoryReviewRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<Review>> {
        let rows = self
            .db
            .reviews
            .visible(scope)
            .into_iter()
            .map(|r| self.joined(r))
            .collect();
        paginate(rows, query)
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Review>> {
        Ok(self.db.reviews.get(id, scope).map(|r| self.joined(r)))
    }
}

#[async_trait]
impl ReviewRepository for MemoryReviewRepository {
    async fn set_status(&self, id: Uuid, status: ReviewStatus) -> AppResult<Option<Review>> {
        Ok(self
            .db
            .reviews
            .update(id, OwnerScope::All, |r| r.status = status)
            .map(|r| self.joined(r)))
    }

    async fn bulk_set_status(&self, ids: &BulkIds, status: ReviewStatus) -> AppResult<u64> {
        Ok(self
            .db
            .reviews
            .update_many(ids.as_slice(), OwnerScope::All, |r| r.status = status))
    }

    async fn respond(
        &self,
        id: Uuid,
        response: &str,
        responder: Uuid,
    ) -> AppResult<Option<Review>> {
        let now = Utc::now();
        Ok(self
            .db
            .reviews
            .update(id, OwnerScope::All, |r| {
                r.admin_response = Some(response.to_string());
                r.responded_by = Some(responder);
                r.responded_at = Some(now);
            })
            .map(|r| self.joined(r)))
    }

    async fn toggle_featured(&self, id: Uuid) -> AppResult<Option<Review>> {
        Ok(self
            .db
            .reviews
            .update(id, OwnerScope::All, |r| r.is_featured = !r.is_featured)
            .map(|r| self.joined(r)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.db.reviews.remove_many(&[id], OwnerScope::All) > 0)
    }

    async fn bulk_delete(&self, ids: &BulkIds) -> AppResult<u64> {
        Ok(self.db.reviews.remove_many(ids.as_slice(), OwnerScope::All))
    }
}
