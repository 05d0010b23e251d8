//! Route entity model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{non_negative_amount, positive_decimal};

db_enum! {
    /// Who created a route; decides who may edit it.
    pub enum CreatorType ("route_creator_type", "creator type") {
        /// Created by an administrator; `created_by` is a user id.
        Admin => "admin",
        /// Created by a vendor; `created_by` is the business id.
        Vendor => "vendor",
    }
}

/// A priced origin → destination transfer route.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Route {
    /// Unique route identifier.
    pub id: Uuid,
    /// Origin location.
    pub origin_location_id: Uuid,
    /// Destination location.
    pub destination_location_id: Uuid,
    /// Display name (e.g. "Airport → Ubud").
    pub route_name: String,
    /// Unique URL slug.
    pub route_slug: String,
    /// Driving distance.
    pub distance_km: Decimal,
    /// Typical duration.
    pub duration_minutes: i32,
    /// Starting price.
    pub base_price: Decimal,
    /// Bookable.
    pub is_active: bool,
    /// Promoted on the public site.
    pub is_popular: bool,
    /// Offered to other vendors.
    pub is_shared: bool,
    /// Creating account (user id for admins, business id for vendors).
    pub created_by: Uuid,
    /// Kind of account in `created_by`.
    pub created_by_type: CreatorType,
    /// When the route was created.
    pub created_at: DateTime<Utc>,
    /// When the route was last updated.
    pub updated_at: DateTime<Utc>,
    /// Origin location name (joined).
    pub origin_name: Option<String>,
    /// Destination location name (joined).
    pub destination_name: Option<String>,
}

impl Route {
    /// Whether the given business created this route.
    pub fn is_owned_by_vendor(&self, business_id: Uuid) -> bool {
        self.created_by_type == CreatorType::Vendor && self.created_by == business_id
    }
}

/// Create/edit form for a route.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RouteInput {
    /// Origin location.
    pub origin_location_id: Uuid,
    /// Destination location.
    pub destination_location_id: Uuid,
    /// Display name.
    #[validate(length(min = 3, max = 200, message = "Route name must be 3 to 200 characters"))]
    pub route_name: String,
    /// Slug; derived from the name when blank.
    #[serde(default)]
    pub route_slug: Option<String>,
    /// Driving distance.
    #[validate(custom(function = "positive_decimal"))]
    pub distance_km: Decimal,
    /// Typical duration.
    #[validate(range(min = 1, max = 2880, message = "Duration must be between 1 and 2880 minutes"))]
    pub duration_minutes: i32,
    /// Starting price.
    #[validate(custom(function = "non_negative_amount"))]
    pub base_price: Decimal,
    /// Bookable.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Offered to other vendors.
    #[serde(default)]
    pub is_shared: bool,
}

fn default_true() -> bool {
    true
}
