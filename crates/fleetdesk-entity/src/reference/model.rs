//! Reference entity models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A pricing zone (a group of nearby locations).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Zone {
    /// Unique zone identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

/// A pickup / drop-off location.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Location {
    /// Unique location identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Pricing zone.
    pub zone_id: Option<Uuid>,
    /// Offered in search forms.
    pub is_active: bool,
}

/// A bookable vehicle class with its price factor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleType {
    /// Unique vehicle type identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Passenger capacity.
    pub max_passengers: i32,
    /// Factor applied to the zone base price.
    pub price_multiplier: Decimal,
}

/// A vehicle body category (sedan, van, …).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VehicleCategory {
    /// Unique category identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}
