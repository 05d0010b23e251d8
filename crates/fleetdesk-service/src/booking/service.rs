//! Booking reads and status writes, scoped to the caller's rows.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use fleetdesk_auth::{RbacEnforcer, RequestContext, SystemPermission};
use fleetdesk_cache::Revalidator;
use fleetdesk_core::error::AppError;
use fleetdesk_core::types::{
    BulkIds, FilterField, FilterOp, FilterValue, ListFilter, ListQuery, OwnerScope, PageResponse,
};
use fleetdesk_database::repositories::{BookingRepository, EXPORT_LIMIT};
use fleetdesk_entity::booking::{
    Booking, BookingFilter, BookingStatus, BookingStatusChange, PaymentStatus,
};

use super::export::{ExportSelection, write_csv};
use crate::paths;
use crate::support::{found, owned};

/// Manages bookings for admins (all rows) and vendors (their rows).
#[derive(Clone)]
pub struct BookingService {
    /// Booking repository.
    repo: Arc<dyn BookingRepository>,
    /// Page cache.
    pages: Revalidator,
    /// Permission checks.
    rbac: Arc<RbacEnforcer>,
}

impl BookingService {
    /// Creates a new booking service.
    pub fn new(
        repo: Arc<dyn BookingRepository>,
        pages: Revalidator,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self { repo, pages, rbac }
    }

    /// Lists the caller's bookings.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &BookingFilter,
    ) -> Result<PageResponse<Booking>, AppError> {
        self.rbac.require(ctx, SystemPermission::BookingView)?;
        let scope = ctx.owner_scope()?;
        let query = filter.to_list_query();

        self.pages
            .cached(list_path(scope), &(&query, scope), &[], || {
                self.repo.list(&query, scope)
            })
            .await
    }

    /// Gets one booking.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Booking, AppError> {
        self.rbac.require(ctx, SystemPermission::BookingView)?;
        let scope = ctx.owner_scope()?;
        found(self.repo.find_by_id(id, scope).await?, "Booking")
    }

    /// Sets the booking status. Cancelling requires a reason.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        status: BookingStatus,
        cancellation_reason: Option<String>,
    ) -> Result<Booking, AppError> {
        self.rbac.require(ctx, SystemPermission::BookingManage)?;
        let scope = ctx.owner_scope()?;
        let change = status_change(status, cancellation_reason)?;

        let updated = self.repo.update_status(id, &change, scope).await?;
        let booking = owned(updated, &*self.repo, id, scope, "Booking").await?;
        self.revalidate(&booking).await;

        info!(
            user_id = %ctx.user_id,
            booking_id = %id,
            status = %status,
            "Booking status updated"
        );
        Ok(booking)
    }

    /// Sets the payment status.
    pub async fn update_payment_status(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Booking, AppError> {
        self.rbac.require(ctx, SystemPermission::BookingManage)?;
        let scope = ctx.owner_scope()?;

        let updated = self.repo.update_payment_status(id, status, scope).await?;
        let booking = owned(updated, &*self.repo, id, scope, "Booking").await?;
        self.revalidate(&booking).await;

        info!(
            user_id = %ctx.user_id,
            booking_id = %id,
            payment_status = %status,
            "Booking payment status updated"
        );
        Ok(booking)
    }

    /// Sets the status of many bookings. Returns the number changed.
    pub async fn bulk_update_status(
        &self,
        ctx: &RequestContext,
        ids: &BulkIds,
        status: BookingStatus,
        cancellation_reason: Option<String>,
    ) -> Result<u64, AppError> {
        self.rbac.require(ctx, SystemPermission::BookingManage)?;
        let scope = ctx.owner_scope()?;
        let change = status_change(status, cancellation_reason)?;

        let updated = self.repo.bulk_update_status(ids, &change, scope).await?;
        self.pages
            .revalidate_paths(&[paths::ADMIN_BOOKINGS, paths::VENDOR_BOOKINGS])
            .await;

        info!(
            user_id = %ctx.user_id,
            requested = ids.len(),
            updated,
            status = %status,
            "Bulk booking status update"
        );
        Ok(updated)
    }

    /// Renders the selected or filtered bookings as CSV, at most
    /// [`EXPORT_LIMIT`] rows.
    pub async fn export_csv(
        &self,
        ctx: &RequestContext,
        selection: ExportSelection,
    ) -> Result<String, AppError> {
        self.rbac.require(ctx, SystemPermission::BookingExport)?;
        let scope = ctx.owner_scope()?;

        let query = match &selection {
            ExportSelection::Ids(ids) => ListQuery::default().filter(FilterField::new(
                "id",
                FilterOp::In,
                FilterValue::UuidList(ids.as_slice().to_vec()),
            )),
            ExportSelection::Filter(filter) => filter.to_list_query(),
        };

        let rows = self.repo.list_for_export(&query, scope).await?;
        let csv = write_csv(&rows);

        info!(
            user_id = %ctx.user_id,
            rows = rows.len(),
            limit = EXPORT_LIMIT,
            "Bookings exported"
        );
        Ok(csv)
    }

    async fn revalidate(&self, booking: &Booking) {
        let admin_detail = paths::detail(paths::ADMIN_BOOKINGS, booking.id);
        self.pages
            .revalidate_paths(&[paths::ADMIN_BOOKINGS, &admin_detail, paths::VENDOR_BOOKINGS])
            .await;
    }
}

fn list_path(scope: OwnerScope) -> &'static str {
    match scope {
        OwnerScope::All => paths::ADMIN_BOOKINGS,
        OwnerScope::Owner(_) => paths::VENDOR_BOOKINGS,
    }
}

fn status_change(
    status: BookingStatus,
    cancellation_reason: Option<String>,
) -> Result<BookingStatusChange, AppError> {
    let reason = fleetdesk_core::text::blank_to_none(cancellation_reason);
    if status == BookingStatus::Cancelled && reason.is_none() {
        return Err(AppError::invalid_field(
            "cancellation_reason",
            "A reason is required to cancel a booking",
        ));
    }
    Ok(BookingStatusChange {
        status,
        cancellation_reason: reason.filter(|_| status == BookingStatus::Cancelled),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use fleetdesk_core::error::ErrorKind;
    use fleetdesk_core::types::PageRequest;
    use fleetdesk_database::MemoryDatabase;
    use rust_decimal::Decimal;

    use super::*;
    use crate::testing::Fixture;

    fn seed(db: &MemoryDatabase, n: usize, business_id: Option<Uuid>) -> Vec<Uuid> {
        let customer = db.add_customer("Ayu Lestari", "ayu@example.com");
        let now = Utc::now();
        (0..n)
            .map(|i| {
                let created = now - Duration::minutes(i as i64);
                db.bookings
                    .insert(Booking {
                        id: Uuid::new_v4(),
                        booking_number: format!("BK-20250301-{i:06}"),
                        customer_id: customer,
                        business_id,
                        vehicle_type_id: None,
                        pickup_address: "Ngurah Rai Airport".into(),
                        dropoff_address: "Ubud".into(),
                        pickup_datetime: created + Duration::days(3),
                        dropoff_datetime: None,
                        passenger_count: 2,
                        luggage_count: 2,
                        base_price: Decimal::new(35_00, 2),
                        amenities_price: Decimal::ZERO,
                        total_price: Decimal::new(35_00, 2),
                        currency_code: "USD".into(),
                        booking_status: BookingStatus::Pending,
                        payment_status: PaymentStatus::Pending,
                        cancellation_reason: None,
                        cancelled_at: None,
                        paid_at: None,
                        notes: None,
                        created_at: created,
                        updated_at: created,
                        customer_name: None,
                        customer_email: None,
                        vehicle_type_name: None,
                    })
                    .id
            })
            .collect()
    }

    #[tokio::test]
    async fn test_third_page_of_twenty_five() {
        let fx = Fixture::new().await;
        seed(&fx.db, 25, None);

        let filter = BookingFilter {
            page: PageRequest::new(3, 10),
            ..Default::default()
        };
        let page = fx.services.bookings.list(&fx.admin, &filter).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_vendor_sees_only_assigned_bookings() {
        let fx = Fixture::new().await;
        let vendor = fx.vendor("Bali Rides");
        seed(&fx.db, 3, vendor.business_id);
        seed(&fx.db, 4, None);

        let page = fx
            .services
            .bookings
            .list(&vendor, &BookingFilter::default())
            .await
            .unwrap();
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_cancel_requires_reason() {
        let fx = Fixture::new().await;
        let id = seed(&fx.db, 1, None)[0];

        let err = fx
            .services
            .bookings
            .update_status(&fx.admin, id, BookingStatus::Cancelled, Some("  ".into()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let cancelled = fx
            .services
            .bookings
            .update_status(
                &fx.admin,
                id,
                BookingStatus::Cancelled,
                Some("Flight cancelled".into()),
            )
            .await
            .unwrap();
        assert!(cancelled.cancelled_at.is_some());
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Flight cancelled"));
    }

    #[tokio::test]
    async fn test_vendor_cannot_touch_other_bookings() {
        let fx = Fixture::new().await;
        let vendor = fx.vendor("Bali Rides");
        let id = seed(&fx.db, 1, None)[0];

        let err = fx
            .services
            .bookings
            .update_status(&vendor, id, BookingStatus::Confirmed, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let err = fx
            .services
            .bookings
            .update_payment_status(&vendor, id, PaymentStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let row = fx.db.bookings.get(id, OwnerScope::All).unwrap();
        assert_eq!(row.booking_status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_list_reflects_status_write() {
        let fx = Fixture::new().await;
        let id = seed(&fx.db, 1, None)[0];
        let svc = &fx.services.bookings;

        let before = svc.list(&fx.admin, &BookingFilter::default()).await.unwrap();
        assert_eq!(before.items[0].booking_status, BookingStatus::Pending);

        svc.update_status(&fx.admin, id, BookingStatus::Confirmed, None)
            .await
            .unwrap();
        let after = svc.list(&fx.admin, &BookingFilter::default()).await.unwrap();
        assert_eq!(after.items[0].booking_status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_export_selected_ids() {
        let fx = Fixture::new().await;
        let ids = seed(&fx.db, 5, None);

        let selection = ExportSelection::Ids(BulkIds::new(ids[..2].to_vec()).unwrap());
        let csv = fx
            .services
            .bookings
            .export_csv(&fx.admin, selection)
            .await
            .unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.starts_with("booking_number,"));
    }

    #[tokio::test]
    async fn test_customer_cannot_export() {
        let fx = Fixture::new().await;
        let customer = RequestContext {
            role: fleetdesk_auth::UserRole::Customer,
            ..RequestContext::admin(Uuid::new_v4())
        };
        let err = fx
            .services
            .bookings
            .export_csv(&customer, ExportSelection::Filter(BookingFilter::default()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }
}
