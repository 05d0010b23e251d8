//! Typed route list filter.

use fleetdesk_core::types::{FilterField, ListFilter, ListQuery, PageRequest, SortField};
use uuid::Uuid;

use super::model::CreatorType;

/// Sort keys accepted for route lists.
pub const ROUTE_SORT_KEYS: &[&str] = &[
    "created_at",
    "route_name",
    "base_price",
    "distance_km",
    "duration_minutes",
];

/// Parsed route list filter.
#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    /// Matches route name, origin name, or destination name.
    pub search: Option<String>,
    /// Origin location.
    pub origin_location_id: Option<Uuid>,
    /// Destination location.
    pub destination_location_id: Option<Uuid>,
    /// Creator kind.
    pub created_by_type: Option<CreatorType>,
    /// Bookable flag.
    pub is_active: Option<bool>,
    /// Popular flag.
    pub is_popular: Option<bool>,
    /// Ordering.
    pub sort: SortField,
    /// Requested page.
    pub page: PageRequest,
}

impl RouteFilter {
    /// The public site's view: active routes only.
    pub fn public(mut self) -> Self {
        self.is_active = Some(true);
        self
    }
}

impl ListFilter for RouteFilter {
    fn to_list_query(&self) -> ListQuery {
        ListQuery::new(self.page)
            .search(
                self.search.as_deref(),
                &["route_name", "origin_name", "destination_name"],
            )
            .filter_opt(self.origin_location_id, |id| {
                FilterField::eq("origin_location_id", id)
            })
            .filter_opt(self.destination_location_id, |id| {
                FilterField::eq("destination_location_id", id)
            })
            .filter_opt(self.created_by_type, |t| {
                FilterField::eq("created_by_type", t.as_str())
            })
            .filter_opt(self.is_active, |v| FilterField::eq("is_active", v))
            .filter_opt(self.is_popular, |v| FilterField::eq("is_popular", v))
            .sort(self.sort.clone())
    }
}
