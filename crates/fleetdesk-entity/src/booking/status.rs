//! Booking and payment status enumerations.

db_enum! {
    /// Lifecycle of a booking.
    pub enum BookingStatus ("booking_status", "booking status") {
        /// Submitted by the customer, not yet accepted.
        Pending => "pending",
        /// Accepted and scheduled.
        Confirmed => "confirmed",
        /// The trip took place.
        Completed => "completed",
        /// Called off; `cancelled_at` and the reason are recorded.
        Cancelled => "cancelled",
    }
}

db_enum! {
    /// Payment state of a booking.
    pub enum PaymentStatus ("payment_status", "payment status") {
        /// No payment attempt yet.
        Pending => "pending",
        /// A payment attempt is in flight.
        Processing => "processing",
        /// Paid; `paid_at` is recorded.
        Completed => "completed",
        /// The last attempt failed.
        Failed => "failed",
        /// The payment was returned to the customer.
        Refunded => "refunded",
    }
}

impl BookingStatus {
    /// Whether the booking can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("Confirmed".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert_eq!("refunded".parse::<PaymentStatus>().unwrap(), PaymentStatus::Refunded);

        let err = "shipped".parse::<BookingStatus>().unwrap_err();
        assert!(err.message.contains("pending, confirmed, completed, cancelled"));
    }

    #[test]
    fn test_serde_is_lowercase() {
        let json = serde_json::to_string(&PaymentStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }

    #[test]
    fn test_terminal() {
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
    }
}
