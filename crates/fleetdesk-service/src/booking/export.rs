//! CSV rendering for booking exports.

use std::borrow::Cow;

use fleetdesk_core::types::BulkIds;
use fleetdesk_entity::booking::{Booking, BookingFilter};

/// Which bookings to export.
#[derive(Debug, Clone)]
pub enum ExportSelection {
    /// Rows picked in the table.
    Ids(BulkIds),
    /// Every row matching the current filter.
    Filter(BookingFilter),
}

const HEADER: &[&str] = &[
    "booking_number",
    "customer_name",
    "customer_email",
    "pickup_address",
    "dropoff_address",
    "pickup_datetime",
    "passenger_count",
    "vehicle_type",
    "total_price",
    "currency_code",
    "booking_status",
    "payment_status",
    "created_at",
];

/// Render bookings as RFC 4180 CSV with a header row.
pub fn write_csv(rows: &[Booking]) -> String {
    let mut out = String::with_capacity(128 * (rows.len() + 1));
    push_record(&mut out, HEADER.iter().map(|h| Cow::Borrowed(*h)));

    for b in rows {
        let fields = [
            Cow::Borrowed(b.booking_number.as_str()),
            Cow::Borrowed(b.customer_name.as_deref().unwrap_or_default()),
            Cow::Borrowed(b.customer_email.as_deref().unwrap_or_default()),
            Cow::Borrowed(b.pickup_address.as_str()),
            Cow::Borrowed(b.dropoff_address.as_str()),
            Cow::Owned(b.pickup_datetime.to_rfc3339()),
            Cow::Owned(b.passenger_count.to_string()),
            Cow::Borrowed(b.vehicle_type_name.as_deref().unwrap_or_default()),
            Cow::Owned(b.total_price.to_string()),
            Cow::Borrowed(b.currency_code.as_str()),
            Cow::Borrowed(b.booking_status.as_str()),
            Cow::Borrowed(b.payment_status.as_str()),
            Cow::Owned(b.created_at.to_rfc3339()),
        ];
        push_record(&mut out, fields.into_iter());
    }
    out
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = Cow<'a, str>>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, &field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    // Leading formula characters are neutralised for spreadsheet apps.
    let guarded = matches!(field.chars().next(), Some('=' | '+' | '-' | '@'))
        && field.parse::<f64>().is_err();
    let needs_quotes = guarded || field.contains([',', '"', '\r', '\n']);

    if !needs_quotes {
        out.push_str(field);
        return;
    }
    out.push('"');
    if guarded {
        out.push('\'');
    }
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(value: &str) -> String {
        let mut out = String::new();
        push_field(&mut out, value);
        out
    }

    #[test]
    fn test_escaping() {
        assert_eq!(field("plain"), "plain");
        assert_eq!(field("Jl. Raya, Ubud"), "\"Jl. Raya, Ubud\"");
        assert_eq!(field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(field("=SUM(A1)"), "\"'=SUM(A1)\"");
        assert_eq!(field("-12.50"), "-12.50");
    }

    #[test]
    fn test_empty_export_has_header() {
        let csv = write_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("booking_number,customer_name"));
    }
}
