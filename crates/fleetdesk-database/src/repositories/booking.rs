//! Booking repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use fleetdesk_core::result::AppResult;
use fleetdesk_core::traits::ListRepository;
use fleetdesk_core::types::{BulkIds, FilterValue, ListQuery, OwnerScope, PageResponse};
use fleetdesk_entity::booking::{Booking, BookingStatus, BookingStatusChange, PaymentStatus};

use crate::memory::table::{collect_all, paginate};
use crate::memory::{MemoryDatabase, Record};
use crate::query::{self, Table};

/// Upper bound on rows returned by a CSV export.
pub const EXPORT_LIMIT: u32 = 10_000;

/// Booking reads and status writes.
#[async_trait]
pub trait BookingRepository: ListRepository<Booking> {
    /// Set the booking status, stamping `cancelled_at` on first cancellation.
    async fn update_status(
        &self,
        id: Uuid,
        change: &BookingStatusChange,
        scope: OwnerScope,
    ) -> AppResult<Option<Booking>>;

    /// Set the payment status, stamping `paid_at` on first completion.
    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        scope: OwnerScope,
    ) -> AppResult<Option<Booking>>;

    /// Apply one status change to many bookings.
    async fn bulk_update_status(
        &self,
        ids: &BulkIds,
        change: &BookingStatusChange,
        scope: OwnerScope,
    ) -> AppResult<u64>;

    /// Every booking matching `query`, capped at [`EXPORT_LIMIT`].
    async fn list_for_export(&self, query: &ListQuery, scope: OwnerScope)
    -> AppResult<Vec<Booking>>;
}

pub(crate) const BOOKINGS: Table = Table {
    name: "bookings",
    alias: "b",
    columns: "b.*, cu.full_name AS customer_name, cu.email AS customer_email, \
              vt.name AS vehicle_type_name",
    from: "FROM bookings b \
           LEFT JOIN customers cu ON cu.id = b.customer_id \
           LEFT JOIN vehicle_types vt ON vt.id = b.vehicle_type_id",
    fields: &[
        ("id", "b.id"),
        ("booking_number", "b.booking_number"),
        ("customer_name", "cu.full_name"),
        ("customer_email", "cu.email"),
        ("booking_status", "b.booking_status::text"),
        ("payment_status", "b.payment_status::text"),
        ("business_id", "b.business_id"),
        ("customer_id", "b.customer_id"),
        ("pickup_datetime", "b.pickup_datetime"),
        ("total_price", "b.total_price"),
        ("created_at", "b.created_at"),
    ],
    owner: Some("b.business_id = "),
};

/// PostgreSQL implementation.
#[derive(Debug, Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn status_update(
        ids: &[Uuid],
        change: &BookingStatusChange,
        scope: OwnerScope,
    ) -> QueryBuilder<'static, Postgres> {
        let cancelling = change.status == BookingStatus::Cancelled;
        let mut qb = QueryBuilder::new("UPDATE bookings b SET booking_status = ");
        qb.push_bind(change.status)
            .push(", cancelled_at = CASE WHEN ")
            .push_bind(cancelling)
            .push(" THEN COALESCE(b.cancelled_at, NOW()) ELSE b.cancelled_at END")
            .push(", cancellation_reason = CASE WHEN ")
            .push_bind(cancelling)
            .push(" THEN ")
            .push_bind(change.cancellation_reason.clone())
            .push(" ELSE b.cancellation_reason END, updated_at = NOW() WHERE b.id = ANY(")
            .push_bind(ids.to_vec())
            .push(")");
        BOOKINGS.push_scope(&mut qb, scope);
        qb
    }
}

#[async_trait]
impl ListRepository<Booking> for PgBookingRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<Booking>> {
        query::fetch_page(&self.pool, &BOOKINGS, query, scope).await
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Booking>> {
        query::fetch_by_id(&self.pool, &BOOKINGS, id, scope).await
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn update_status(
        &self,
        id: Uuid,
        change: &BookingStatusChange,
        scope: OwnerScope,
    ) -> AppResult<Option<Booking>> {
        let result = Self::status_update(&[id], change, scope)
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| query::write_error(&BOOKINGS, e))?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        query::fetch_by_id(&self.pool, &BOOKINGS, id, scope).await
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        scope: OwnerScope,
    ) -> AppResult<Option<Booking>> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE bookings b SET payment_status = ");
        qb.push_bind(status)
            .push(", paid_at = CASE WHEN ")
            .push_bind(status == PaymentStatus::Completed)
            .push(" THEN COALESCE(b.paid_at, NOW()) ELSE b.paid_at END, updated_at = NOW() WHERE b.id = ")
            .push_bind(id);
        BOOKINGS.push_scope(&mut qb, scope);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| query::write_error(&BOOKINGS, e))?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        query::fetch_by_id(&self.pool, &BOOKINGS, id, scope).await
    }

    async fn bulk_update_status(
        &self,
        ids: &BulkIds,
        change: &BookingStatusChange,
        scope: OwnerScope,
    ) -> AppResult<u64> {
        Self::status_update(ids.as_slice(), change, scope)
            .build()
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected())
            .map_err(|e| query::write_error(&BOOKINGS, e))
    }

    async fn list_for_export(
        &self,
        query: &ListQuery,
        scope: OwnerScope,
    ) -> AppResult<Vec<Booking>> {
        query::fetch_all(&self.pool, &BOOKINGS, query, scope, EXPORT_LIMIT).await
    }
}

impl Record for Booking {
    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        Some(match name {
            "id" => self.id.into(),
            "booking_number" => self.booking_number.as_str().into(),
            "customer_name" => self.customer_name.clone().into(),
            "customer_email" => self.customer_email.clone().into(),
            "booking_status" => self.booking_status.as_str().into(),
            "payment_status" => self.payment_status.as_str().into(),
            "business_id" => self.business_id.into(),
            "customer_id" => self.customer_id.into(),
            "pickup_datetime" => self.pickup_datetime.into(),
            "total_price" => decimal(self.total_price),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }

    fn owner(&self) -> Option<Uuid> {
        self.business_id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

pub(crate) fn decimal(value: rust_decimal::Decimal) -> FilterValue {
    use rust_decimal::prelude::ToPrimitive;
    value.to_f64().map(FilterValue::Float).unwrap_or(FilterValue::Null)
}

/// In-memory implementation.
#[derive(Debug, Clone)]
pub struct MemoryBookingRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryBookingRepository {
    /// Create a repository over the shared in-memory tables.
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }

    fn joined(&self, mut booking: Booking) -> Booking {
        if let Some(customer) = self.db.customer(booking.customer_id) {
            booking.customer_name = Some(customer.full_name);
            booking.customer_email = Some(customer.email);
        }
        booking.vehicle_type_name = self.db.vehicle_type_name(booking.vehicle_type_id);
        booking
    }

    fn rows(&self, scope: OwnerScope) -> Vec<Booking> {
        self.db
            .bookings
            .visible(scope)
            .into_iter()
            .map(|b| self.joined(b))
            .collect()
    }
}

#[async_trait]
impl ListRepository<Booking> for MemoryBookingRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<Booking>> {
        paginate(self.rows(scope), query)
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Booking>> {
        Ok(self.db.bookings.get(id, scope).map(|b| self.joined(b)))
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn update_status(
        &self,
        id: Uuid,
        change: &BookingStatusChange,
        scope: OwnerScope,
    ) -> AppResult<Option<Booking>> {
        let now = Utc::now();
        Ok(self
            .db
            .bookings
            .update(id, scope, |b| b.apply_status(change, now))
            .map(|b| self.joined(b)))
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        scope: OwnerScope,
    ) -> AppResult<Option<Booking>> {
        let now = Utc::now();
        Ok(self
            .db
            .bookings
            .update(id, scope, |b| b.apply_payment(status, now))
            .map(|b| self.joined(b)))
    }

    async fn bulk_update_status(
        &self,
        ids: &BulkIds,
        change: &BookingStatusChange,
        scope: OwnerScope,
    ) -> AppResult<u64> {
        let now = Utc::now();
        Ok(self
            .db
            .bookings
            .update_many(ids.as_slice(), scope, |b| b.apply_status(change, now)))
    }

    async fn list_for_export(
        &self,
        query: &ListQuery,
        scope: OwnerScope,
    ) -> AppResult<Vec<Booking>> {
        collect_all(self.rows(scope), query, EXPORT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdesk_core::types::{FilterField, PageRequest};
    use rust_decimal::Decimal;

    fn booking(db: &MemoryDatabase, customer_id: Uuid, business_id: Option<Uuid>, n: u32) -> Booking {
        let now = Utc::now();
        db.bookings.insert(Booking {
            id: Uuid::new_v4(),
            booking_number: format!("BK-20250301-{n:06}"),
            customer_id,
            business_id,
            vehicle_type_id: None,
            pickup_address: "Ngurah Rai Airport".into(),
            dropoff_address: "Ubud".into(),
            pickup_datetime: now,
            dropoff_datetime: None,
            passenger_count: 2,
            luggage_count: 2,
            base_price: Decimal::new(3500, 2),
            amenities_price: Decimal::ZERO,
            total_price: Decimal::new(3500, 2),
            currency_code: "USD".into(),
            booking_status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            cancellation_reason: None,
            cancelled_at: None,
            paid_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
            customer_name: None,
            customer_email: None,
            vehicle_type_name: None,
        })
    }

    #[test]
    fn test_select_joins_customer() {
        let qb = BOOKINGS
            .select_query(
                &ListQuery::default().search(Some("ann"), &["customer_name"]),
                OwnerScope::Owner(Uuid::new_v4()),
            )
            .unwrap();
        let sql = qb.sql();
        assert!(sql.contains("LEFT JOIN customers cu"));
        assert!(sql.contains("b.business_id = $1 AND (cu.full_name ILIKE $2)"));
        assert!(sql.contains("ORDER BY b.created_at DESC NULLS LAST, b.id DESC"));
    }

    #[tokio::test]
    async fn test_page_three_of_twenty_five() {
        let db = Arc::new(MemoryDatabase::new());
        let customer = db.add_customer("Ann Lee", "ann@example.com");
        for n in 0..25 {
            booking(&db, customer, None, n);
        }
        let repo = MemoryBookingRepository::new(db);

        let page = repo
            .list(&ListQuery::new(PageRequest::new(3, 10)), OwnerScope::All)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items[0].customer_name.as_deref(), Some("Ann Lee"));
    }

    #[tokio::test]
    async fn test_vendor_scope_limits_writes() {
        let db = Arc::new(MemoryDatabase::new());
        let customer = db.add_customer("Ann Lee", "ann@example.com");
        let vendor = db.add_business("Bali Transfers");
        let mine = booking(&db, customer, Some(vendor), 1);
        let other = booking(&db, customer, None, 2);
        let repo = MemoryBookingRepository::new(db);

        let change = BookingStatusChange {
            status: BookingStatus::Confirmed,
            cancellation_reason: None,
        };
        let ids = BulkIds::new([mine.id, other.id]).unwrap();
        let changed = repo
            .bulk_update_status(&ids, &change, OwnerScope::Owner(vendor))
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let untouched = repo.find_by_id(other.id, OwnerScope::All).await.unwrap().unwrap();
        assert_eq!(untouched.booking_status, BookingStatus::Pending);
        assert!(
            repo.find_by_id(other.id, OwnerScope::Owner(vendor))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_export_selected_ids() {
        let db = Arc::new(MemoryDatabase::new());
        let customer = db.add_customer("Ann Lee", "ann@example.com");
        let picked = booking(&db, customer, None, 1);
        booking(&db, customer, None, 2);
        let repo = MemoryBookingRepository::new(db);

        let query = ListQuery::default().filter(FilterField::new(
            "id",
            fleetdesk_core::types::FilterOp::In,
            FilterValue::UuidList(vec![picked.id]),
        ));
        let rows = repo.list_for_export(&query, OwnerScope::All).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, picked.id);
    }
}
