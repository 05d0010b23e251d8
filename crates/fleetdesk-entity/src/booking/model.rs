//! Booking entity model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{BookingStatus, PaymentStatus};

/// A customer's transfer booking.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: Uuid,
    /// Human-facing reference (e.g. `BK-20250301-4F2A9C`).
    pub booking_number: String,
    /// The customer who booked.
    pub customer_id: Uuid,
    /// The vendor assigned to fulfil the booking.
    pub business_id: Option<Uuid>,
    /// Requested vehicle type.
    pub vehicle_type_id: Option<Uuid>,
    /// Pickup address.
    pub pickup_address: String,
    /// Drop-off address.
    pub dropoff_address: String,
    /// Pickup date and time.
    pub pickup_datetime: DateTime<Utc>,
    /// Drop-off date and time (for return or hourly bookings).
    pub dropoff_datetime: Option<DateTime<Utc>>,
    /// Number of passengers.
    pub passenger_count: i32,
    /// Number of luggage items.
    pub luggage_count: i32,
    /// Transfer price before extras.
    pub base_price: Decimal,
    /// Price of selected amenities.
    pub amenities_price: Decimal,
    /// Amount charged.
    pub total_price: Decimal,
    /// ISO currency code of the prices.
    pub currency_code: String,
    /// Booking lifecycle status.
    pub booking_status: BookingStatus,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// Why the booking was cancelled.
    pub cancellation_reason: Option<String>,
    /// When the booking was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// When payment completed.
    pub paid_at: Option<DateTime<Utc>>,
    /// Free-form customer notes.
    pub notes: Option<String>,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// When the booking was last updated.
    pub updated_at: DateTime<Utc>,
    /// Customer display name (joined).
    pub customer_name: Option<String>,
    /// Customer email (joined).
    pub customer_email: Option<String>,
    /// Vehicle type name (joined).
    pub vehicle_type_name: Option<String>,
}

/// A booking status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingStatusChange {
    /// The new status.
    pub status: BookingStatus,
    /// Recorded when `status` is `Cancelled`, ignored otherwise.
    pub cancellation_reason: Option<String>,
}

impl Booking {
    /// Apply a status write in place, keeping the cancellation invariants:
    /// `cancelled_at` is stamped on the first cancellation and the reason is
    /// recorded with it.
    pub fn apply_status(&mut self, change: &BookingStatusChange, now: DateTime<Utc>) {
        self.booking_status = change.status;
        if change.status == BookingStatus::Cancelled {
            self.cancelled_at.get_or_insert(now);
            self.cancellation_reason = change.cancellation_reason.clone();
        }
        self.updated_at = now;
    }

    /// Apply a payment status write in place; `paid_at` is stamped on the
    /// first completed payment.
    pub fn apply_payment(&mut self, status: PaymentStatus, now: DateTime<Utc>) {
        self.payment_status = status;
        if status == PaymentStatus::Completed {
            self.paid_at.get_or_insert(now);
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            booking_number: "BK-20250301-000001".into(),
            customer_id: Uuid::new_v4(),
            business_id: None,
            vehicle_type_id: None,
            pickup_address: "Airport".into(),
            dropoff_address: "Hotel".into(),
            pickup_datetime: now,
            dropoff_datetime: None,
            passenger_count: 2,
            luggage_count: 1,
            base_price: Decimal::new(4000, 2),
            amenities_price: Decimal::ZERO,
            total_price: Decimal::new(4000, 2),
            currency_code: "EUR".into(),
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
        }
    }

    #[test]
    fn test_cancel_records_reason_and_time_once() {
        let mut booking = sample();
        let first = Utc::now();
        booking.apply_status(
            &BookingStatusChange {
                status: BookingStatus::Cancelled,
                cancellation_reason: Some("Flight cancelled".into()),
            },
            first,
        );
        assert_eq!(booking.cancelled_at, Some(first));
        assert_eq!(booking.cancellation_reason.as_deref(), Some("Flight cancelled"));

        let later = first + Duration::minutes(5);
        booking.apply_status(
            &BookingStatusChange {
                status: BookingStatus::Cancelled,
                cancellation_reason: Some("Duplicate".into()),
            },
            later,
        );
        assert_eq!(booking.cancelled_at, Some(first));
        assert_eq!(booking.updated_at, later);
    }

    #[test]
    fn test_payment_completion_sets_paid_at() {
        let mut booking = sample();
        let now = Utc::now();
        booking.apply_payment(PaymentStatus::Processing, now);
        assert!(booking.paid_at.is_none());
        booking.apply_payment(PaymentStatus::Completed, now);
        assert_eq!(booking.paid_at, Some(now));
    }
}
