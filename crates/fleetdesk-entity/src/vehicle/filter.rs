//! Typed vehicle list filter.

use fleetdesk_core::types::{FilterField, ListFilter, ListQuery, PageRequest, SortField};
use uuid::Uuid;

use super::model::{FuelType, Transmission};

/// Sort keys accepted for vehicle lists.
pub const VEHICLE_SORT_KEYS: &[&str] = &["created_at", "make", "year", "seats"];

/// Parsed vehicle list filter.
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    /// Matches make, model, or registration number.
    pub search: Option<String>,
    /// Owning vendor (admin only).
    pub business_id: Option<Uuid>,
    /// Vehicle category.
    pub category_id: Option<Uuid>,
    /// Vehicle type.
    pub vehicle_type_id: Option<Uuid>,
    /// Fuel type.
    pub fuel_type: Option<FuelType>,
    /// Transmission.
    pub transmission: Option<Transmission>,
    /// Availability flag.
    pub is_available: Option<bool>,
    /// Ordering.
    pub sort: SortField,
    /// Requested page.
    pub page: PageRequest,
}

impl ListFilter for VehicleFilter {
    fn to_list_query(&self) -> ListQuery {
        ListQuery::new(self.page)
            .search(
                self.search.as_deref(),
                &["make", "model", "registration_number"],
            )
            .filter_opt(self.business_id, |id| FilterField::eq("business_id", id))
            .filter_opt(self.category_id, |id| FilterField::eq("category_id", id))
            .filter_opt(self.vehicle_type_id, |id| {
                FilterField::eq("vehicle_type_id", id)
            })
            .filter_opt(self.fuel_type, |f| FilterField::eq("fuel_type", f.as_str()))
            .filter_opt(self.transmission, |t| {
                FilterField::eq("transmission", t.as_str())
            })
            .filter_opt(self.is_available, |v| FilterField::eq("is_available", v))
            .sort(self.sort.clone())
    }
}
