//! Review moderation and the public testimonials feed.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use fleetdesk_auth::{RbacEnforcer, RequestContext, SystemPermission};
use fleetdesk_cache::Revalidator;
use fleetdesk_core::error::AppError;
use fleetdesk_core::types::{BulkIds, ListFilter, OwnerScope, PageResponse};
use fleetdesk_database::repositories::ReviewRepository;
use fleetdesk_entity::review::{Review, ReviewFilter, ReviewResponseInput, ReviewStatus};

use crate::paths;
use crate::support::{found, validate};

/// Moderates customer reviews.
#[derive(Clone)]
pub struct ReviewService {
    /// Review repository.
    repo: Arc<dyn ReviewRepository>,
    /// Page cache.
    pages: Revalidator,
    /// Permission checks.
    rbac: Arc<RbacEnforcer>,
}

impl ReviewService {
    /// Creates a new review service.
    pub fn new(
        repo: Arc<dyn ReviewRepository>,
        pages: Revalidator,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self { repo, pages, rbac }
    }

    /// Lists reviews in any status.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &ReviewFilter,
    ) -> Result<PageResponse<Review>, AppError> {
        self.rbac.require(ctx, SystemPermission::ReviewManage)?;
        let query = filter.to_list_query();
        self.pages
            .cached(paths::ADMIN_REVIEWS, &query, &[], || {
                self.repo.list(&query, OwnerScope::All)
            })
            .await
    }

    /// Gets one review.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Review, AppError> {
        self.rbac.require(ctx, SystemPermission::ReviewManage)?;
        found(self.repo.find_by_id(id, OwnerScope::All).await?, "Review")
    }

    /// Approved, featured reviews for the public site.
    pub async fn public_featured(
        &self,
        filter: ReviewFilter,
    ) -> Result<PageResponse<Review>, AppError> {
        let query = filter.featured().to_list_query();
        self.pages
            .cached(paths::PUBLIC_REVIEWS, &query, &[], || {
                self.repo.list(&query, OwnerScope::All)
            })
            .await
    }

    /// Approves or rejects a review.
    pub async fn set_status(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        status: ReviewStatus,
    ) -> Result<Review, AppError> {
        self.rbac.require(ctx, SystemPermission::ReviewManage)?;
        ensure_decision(status)?;

        let review = found(self.repo.set_status(id, status).await?, "Review")?;
        self.revalidate(Some(id)).await;

        info!(admin_id = %ctx.user_id, review_id = %id, status = %status, "Review moderated");
        Ok(review)
    }

    /// Approves or rejects many reviews.
    pub async fn bulk_set_status(
        &self,
        ctx: &RequestContext,
        ids: &BulkIds,
        status: ReviewStatus,
    ) -> Result<u64, AppError> {
        self.rbac.require(ctx, SystemPermission::ReviewManage)?;
        ensure_decision(status)?;

        let updated = self.repo.bulk_set_status(ids, status).await?;
        self.revalidate(None).await;

        info!(
            admin_id = %ctx.user_id,
            requested = ids.len(),
            updated,
            status = %status,
            "Bulk review moderation"
        );
        Ok(updated)
    }

    /// Records a public reply from the caller.
    pub async fn respond(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        mut input: ReviewResponseInput,
    ) -> Result<Review, AppError> {
        self.rbac.require(ctx, SystemPermission::ReviewManage)?;
        input.response = input.response.trim().to_string();
        validate(&input)?;

        let review = found(
            self.repo.respond(id, &input.response, ctx.user_id).await?,
            "Review",
        )?;
        self.revalidate(Some(id)).await;

        info!(admin_id = %ctx.user_id, review_id = %id, "Review response recorded");
        Ok(review)
    }

    /// Flips `is_featured`.
    pub async fn toggle_featured(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Review, AppError> {
        self.rbac.require(ctx, SystemPermission::ReviewManage)?;

        let review = found(self.repo.toggle_featured(id).await?, "Review")?;
        self.revalidate(Some(id)).await;

        info!(
            admin_id = %ctx.user_id,
            review_id = %id,
            is_featured = review.is_featured,
            "Review featured flag toggled"
        );
        Ok(review)
    }

    /// Deletes a review.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        self.rbac.require(ctx, SystemPermission::ReviewManage)?;

        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("Review not found"));
        }
        self.revalidate(Some(id)).await;

        info!(admin_id = %ctx.user_id, review_id = %id, "Review deleted");
        Ok(())
    }

    /// Deletes many reviews.
    pub async fn bulk_delete(&self, ctx: &RequestContext, ids: &BulkIds) -> Result<u64, AppError> {
        self.rbac.require(ctx, SystemPermission::ReviewManage)?;

        let deleted = self.repo.bulk_delete(ids).await?;
        self.revalidate(None).await;

        info!(admin_id = %ctx.user_id, requested = ids.len(), deleted, "Bulk review delete");
        Ok(deleted)
    }

    async fn revalidate(&self, id: Option<Uuid>) {
        let detail = id.map(|id| paths::detail(paths::ADMIN_REVIEWS, id));
        let mut targets = vec![paths::ADMIN_REVIEWS, paths::PUBLIC_REVIEWS];
        if let Some(detail) = &detail {
            targets.push(detail);
        }
        self.pages.revalidate_paths(&targets).await;
    }
}

/// Moderation moves a review to approved or rejected, never back to pending.
fn ensure_decision(status: ReviewStatus) -> Result<(), AppError> {
    match status {
        ReviewStatus::Approved | ReviewStatus::Rejected => Ok(()),
        ReviewStatus::Pending => Err(AppError::invalid_field(
            "status",
            "Status must be approved or rejected",
        )),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fleetdesk_core::error::ErrorKind;

    use super::*;
    use crate::testing::Fixture;

    fn seed(fx: &Fixture, rating: i32) -> Uuid {
        let customer = fx.db.add_customer("Made Wirawan", "made@example.com");
        let now = Utc::now();
        fx.db
            .reviews
            .insert(Review {
                id: Uuid::new_v4(),
                customer_id: customer,
                booking_id: None,
                rating,
                title: None,
                review_text: "Driver waited despite our delayed flight.".into(),
                status: ReviewStatus::Pending,
                is_featured: false,
                admin_response: None,
                responded_by: None,
                responded_at: None,
                created_at: now,
                updated_at: now,
                customer_name: None,
            })
            .id
    }

    #[tokio::test]
    async fn test_public_feed_needs_approved_and_featured() {
        let fx = Fixture::new().await;
        let svc = &fx.services.reviews;
        let approved = seed(&fx, 5);
        let pending = seed(&fx, 4);

        svc.set_status(&fx.admin, approved, ReviewStatus::Approved).await.unwrap();
        svc.toggle_featured(&fx.admin, approved).await.unwrap();
        svc.toggle_featured(&fx.admin, pending).await.unwrap();

        let page = svc.public_featured(ReviewFilter::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, approved);
    }

    #[tokio::test]
    async fn test_pending_is_not_a_decision() {
        let fx = Fixture::new().await;
        let id = seed(&fx, 3);
        let err = fx
            .services
            .reviews
            .set_status(&fx.admin, id, ReviewStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_respond_trims_and_records_responder() {
        let fx = Fixture::new().await;
        let id = seed(&fx, 5);
        let review = fx
            .services
            .reviews
            .respond(
                &fx.admin,
                id,
                ReviewResponseInput {
                    response: "  Terima kasih!  ".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(review.admin_response.as_deref(), Some("Terima kasih!"));
        assert_eq!(review.responded_by, Some(fx.admin.user_id));
        assert!(review.responded_at.is_some());
    }

    #[tokio::test]
    async fn test_vendor_cannot_moderate() {
        let fx = Fixture::new().await;
        let vendor = fx.vendor("Bali Rides");
        let id = seed(&fx, 1);

        let err = fx.services.reviews.delete(&vendor, id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(fx.db.reviews.get(id, OwnerScope::All).is_some());
    }
}
