//! In-memory backend used for local development and tests.
//!
//! Joined display columns (customer names, post counts, …) are computed at
//! read time from the other tables, so rows only store their own columns.

pub mod table;

use dashmap::DashMap;
use uuid::Uuid;

use fleetdesk_entity::blog::{BlogCategory, BlogPost, BlogTag};
use fleetdesk_entity::booking::Booking;
use fleetdesk_entity::currency::Currency;
use fleetdesk_entity::reference::{Location, VehicleCategory, VehicleType, Zone, ZonePrice};
use fleetdesk_entity::review::Review;
use fleetdesk_entity::route::Route;
use fleetdesk_entity::vehicle::Vehicle;

pub use table::{MemoryTable, Record};

/// A customer account, as far as the back office needs it.
#[derive(Debug, Clone)]
pub struct CustomerRecord {
    /// Display name.
    pub full_name: String,
    /// Contact email.
    pub email: String,
}

/// Every table of the in-memory backend.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    pub customers: DashMap<Uuid, CustomerRecord>,
    pub businesses: DashMap<Uuid, String>,
    pub zones: DashMap<Uuid, Zone>,
    pub locations: DashMap<Uuid, Location>,
    pub vehicle_types: DashMap<Uuid, VehicleType>,
    pub vehicle_categories: DashMap<Uuid, VehicleCategory>,
    pub zone_prices: MemoryTable<ZonePrice>,
    pub bookings: MemoryTable<Booking>,
    pub vehicles: MemoryTable<Vehicle>,
    pub blog_posts: MemoryTable<BlogPost>,
    pub blog_categories: MemoryTable<BlogCategory>,
    pub blog_tags: MemoryTable<BlogTag>,
    pub reviews: MemoryTable<Review>,
    pub routes: MemoryTable<Route>,
    pub currencies: MemoryTable<Currency>,
}

impl MemoryDatabase {
    /// An empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a customer and return its id.
    pub fn add_customer(&self, full_name: &str, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.customers.insert(
            id,
            CustomerRecord {
                full_name: full_name.to_string(),
                email: email.to_string(),
            },
        );
        id
    }

    /// Register a vendor business and return its id.
    pub fn add_business(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.businesses.insert(id, name.to_string());
        id
    }

    /// Register a pricing zone and return its id.
    pub fn add_zone(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.zones.insert(
            id,
            Zone {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    /// Register an active location inside `zone_id` and return its id.
    pub fn add_location(&self, name: &str, zone_id: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        self.locations.insert(
            id,
            Location {
                id,
                name: name.to_string(),
                zone_id,
                is_active: true,
            },
        );
        id
    }

    /// Register a vehicle type and return its id.
    pub fn add_vehicle_type(&self, vehicle_type: VehicleType) -> Uuid {
        let id = vehicle_type.id;
        self.vehicle_types.insert(id, vehicle_type);
        id
    }

    /// Register a vehicle category and return its id.
    pub fn add_vehicle_category(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.vehicle_categories.insert(
            id,
            VehicleCategory {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    pub(crate) fn customer(&self, id: Uuid) -> Option<CustomerRecord> {
        self.customers.get(&id).map(|c| c.value().clone())
    }

    pub(crate) fn business_name(&self, id: Uuid) -> Option<String> {
        self.businesses.get(&id).map(|b| b.value().clone())
    }

    pub(crate) fn location_name(&self, id: Uuid) -> Option<String> {
        self.locations.get(&id).map(|l| l.name.clone())
    }

    pub(crate) fn zone_name(&self, id: Uuid) -> Option<String> {
        self.zones.get(&id).map(|z| z.name.clone())
    }

    pub(crate) fn vehicle_type_name(&self, id: Option<Uuid>) -> Option<String> {
        id.and_then(|id| self.vehicle_types.get(&id).map(|t| t.name.clone()))
    }

    pub(crate) fn vehicle_category_name(&self, id: Option<Uuid>) -> Option<String> {
        id.and_then(|id| self.vehicle_categories.get(&id).map(|c| c.name.clone()))
    }
}
