//! Typed booking list filter.

use chrono::{DateTime, Utc};
use fleetdesk_core::types::{FilterField, ListFilter, ListQuery, PageRequest, SortField};
use uuid::Uuid;

use super::status::{BookingStatus, PaymentStatus};

/// Sort keys accepted for booking lists.
pub const BOOKING_SORT_KEYS: &[&str] = &[
    "created_at",
    "pickup_datetime",
    "total_price",
    "booking_number",
];

/// Parsed booking list filter.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Matches booking number, customer name, or customer email.
    pub search: Option<String>,
    /// Booking status.
    pub status: Option<BookingStatus>,
    /// Payment status.
    pub payment_status: Option<PaymentStatus>,
    /// Assigned vendor (admin only).
    pub business_id: Option<Uuid>,
    /// Booking customer.
    pub customer_id: Option<Uuid>,
    /// Inclusive lower bound on the pickup time.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the pickup time.
    pub date_to: Option<DateTime<Utc>>,
    /// Ordering.
    pub sort: SortField,
    /// Requested page.
    pub page: PageRequest,
}

impl ListFilter for BookingFilter {
    fn to_list_query(&self) -> ListQuery {
        ListQuery::new(self.page)
            .search(
                self.search.as_deref(),
                &["booking_number", "customer_name", "customer_email"],
            )
            .filter_opt(self.status, |s| FilterField::eq("booking_status", s.as_str()))
            .filter_opt(self.payment_status, |s| {
                FilterField::eq("payment_status", s.as_str())
            })
            .filter_opt(self.business_id, |id| FilterField::eq("business_id", id))
            .filter_opt(self.customer_id, |id| FilterField::eq("customer_id", id))
            .filter_opt(self.date_from, |d| FilterField::gte("pickup_datetime", d))
            .filter_opt(self.date_to, |d| FilterField::lte("pickup_datetime", d))
            .sort(self.sort.clone())
    }
}
