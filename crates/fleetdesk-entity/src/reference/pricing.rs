//! Zone pricing and quotes.

use chrono::{DateTime, Utc};
use fleetdesk_core::types::{FilterField, ListFilter, ListQuery, PageRequest, SortField};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::non_negative_amount;

/// The base price between two zones. A price applies in both directions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ZonePrice {
    /// Unique price identifier.
    pub id: Uuid,
    /// One end of the pair.
    pub origin_zone_id: Uuid,
    /// Other end of the pair.
    pub destination_zone_id: Uuid,
    /// Base price for the pair.
    pub base_price: Decimal,
    /// When the price was created.
    pub created_at: DateTime<Utc>,
    /// When the price was last updated.
    pub updated_at: DateTime<Utc>,
    /// Origin zone name (joined).
    pub origin_zone_name: Option<String>,
    /// Destination zone name (joined).
    pub destination_zone_name: Option<String>,
}

/// Create or replace the price of a zone pair.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ZonePriceInput {
    /// One end of the pair.
    pub origin_zone_id: Uuid,
    /// Other end of the pair.
    pub destination_zone_id: Uuid,
    /// Base price.
    #[validate(custom(function = "non_negative_amount"))]
    pub base_price: Decimal,
}

/// Quote request from the public booking form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuoteRequest {
    /// Pickup location.
    pub origin_location_id: Uuid,
    /// Drop-off location.
    pub destination_location_id: Uuid,
    /// Requested vehicle type.
    pub vehicle_type_id: Uuid,
}

/// A computed transfer price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Origin zone used for the lookup.
    pub origin_zone_id: Uuid,
    /// Destination zone used for the lookup.
    pub destination_zone_id: Uuid,
    /// Requested vehicle type.
    pub vehicle_type_id: Uuid,
    /// Zone-pair base price.
    pub base_price: Decimal,
    /// Vehicle type factor.
    pub price_multiplier: Decimal,
    /// `base_price × price_multiplier`, rounded half-up to cents.
    pub total_price: Decimal,
}

impl Quote {
    /// Compute a quote from its inputs.
    pub fn compute(
        origin_zone_id: Uuid,
        destination_zone_id: Uuid,
        vehicle_type_id: Uuid,
        base_price: Decimal,
        price_multiplier: Decimal,
    ) -> Self {
        let total_price = (base_price * price_multiplier)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self {
            origin_zone_id,
            destination_zone_id,
            vehicle_type_id,
            base_price,
            price_multiplier,
            total_price,
        }
    }
}

/// Sort keys accepted for zone price lists.
pub const ZONE_PRICE_SORT_KEYS: &[&str] = &["created_at", "base_price", "origin_zone_name"];

/// Parsed zone price list filter.
#[derive(Debug, Clone, Default)]
pub struct ZonePriceFilter {
    /// Matches either zone name.
    pub search: Option<String>,
    /// Rows where this zone is the origin.
    pub origin_zone_id: Option<Uuid>,
    /// Ordering.
    pub sort: SortField,
    /// Requested page.
    pub page: PageRequest,
}

impl ListFilter for ZonePriceFilter {
    fn to_list_query(&self) -> ListQuery {
        ListQuery::new(self.page)
            .search(
                self.search.as_deref(),
                &["origin_zone_name", "destination_zone_name"],
            )
            .filter_opt(self.origin_zone_id, |id| FilterField::eq("origin_zone_id", id))
            .sort(self.sort.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_multiplies_and_rounds() {
        let quote = Quote::compute(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Decimal::new(3333, 2),
            Decimal::new(15, 1),
        );
        // 33.33 × 1.5 = 49.995
        assert_eq!(quote.total_price, Decimal::new(5000, 2));
    }
}
