//! Reference data used by forms and pricing: locations, zones, vehicle
//! types and categories, and zone-pair prices.

pub mod model;
pub mod pricing;

pub use model::{Location, VehicleCategory, VehicleType, Zone};
pub use pricing::{Quote, QuoteRequest, ZONE_PRICE_SORT_KEYS, ZonePrice, ZonePriceFilter, ZonePriceInput};
