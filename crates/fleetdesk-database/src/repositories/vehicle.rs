//! Vehicle repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use fleetdesk_core::error::AppError;
use fleetdesk_core::result::AppResult;
use fleetdesk_core::traits::ListRepository;
use fleetdesk_core::types::{BulkIds, FilterValue, ListQuery, OwnerScope, PageResponse};
use fleetdesk_entity::vehicle::{Vehicle, VehicleInput};

use crate::memory::table::paginate;
use crate::memory::{MemoryDatabase, Record};
use crate::query::{self, Table, messages};

/// Fleet reads and writes. Every write is scoped to the owning vendor.
#[async_trait]
pub trait VehicleRepository: ListRepository<Vehicle> {
    /// Insert a vehicle owned by `business_id`.
    async fn create(&self, business_id: Uuid, input: &VehicleInput) -> AppResult<Vehicle>;

    /// Replace the editable columns. The owner never changes.
    async fn update(
        &self,
        id: Uuid,
        input: &VehicleInput,
        scope: OwnerScope,
    ) -> AppResult<Option<Vehicle>>;

    /// Delete one vehicle; `false` when nothing matched.
    async fn delete(&self, id: Uuid, scope: OwnerScope) -> AppResult<bool>;

    /// Flip `is_available`.
    async fn toggle_availability(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Vehicle>>;

    /// Set `is_available` on many vehicles.
    async fn bulk_set_availability(
        &self,
        ids: &BulkIds,
        available: bool,
        scope: OwnerScope,
    ) -> AppResult<u64>;

    /// Delete many vehicles.
    async fn bulk_delete(&self, ids: &BulkIds, scope: OwnerScope) -> AppResult<u64>;
}

pub(crate) const VEHICLES: Table = Table {
    name: "vehicles",
    alias: "v",
    columns: "v.*, bu.business_name, vc.name AS category_name, vt.name AS vehicle_type_name",
    from: "FROM vehicles v \
           LEFT JOIN businesses bu ON bu.id = v.business_id \
           LEFT JOIN vehicle_categories vc ON vc.id = v.category_id \
           LEFT JOIN vehicle_types vt ON vt.id = v.vehicle_type_id",
    fields: &[
        ("id", "v.id"),
        ("make", "v.make"),
        ("model", "v.model"),
        ("registration_number", "v.registration_number"),
        ("business_id", "v.business_id"),
        ("category_id", "v.category_id"),
        ("vehicle_type_id", "v.vehicle_type_id"),
        ("fuel_type", "v.fuel_type::text"),
        ("transmission", "v.transmission::text"),
        ("is_available", "v.is_available"),
        ("year", "v.year"),
        ("seats", "v.seats"),
        ("created_at", "v.created_at"),
    ],
    owner: Some("v.business_id = "),
};

/// PostgreSQL implementation.
#[derive(Debug, Clone)]
pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    /// Create a new vehicle repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListRepository<Vehicle> for PgVehicleRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<Vehicle>> {
        query::fetch_page(&self.pool, &VEHICLES, query, scope).await
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Vehicle>> {
        query::fetch_by_id(&self.pool, &VEHICLES, id, scope).await
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn create(&self, business_id: Uuid, input: &VehicleInput) -> AppResult<Vehicle> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO vehicles (id, business_id, make, model, year, registration_number, color, \
             category_id, vehicle_type_id, fuel_type, transmission, seats, luggage_capacity, \
             image_urls, is_available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(business_id)
        .bind(&input.make)
        .bind(&input.model)
        .bind(input.year)
        .bind(&input.registration_number)
        .bind(&input.color)
        .bind(input.category_id)
        .bind(input.vehicle_type_id)
        .bind(input.fuel_type)
        .bind(input.transmission)
        .bind(input.seats)
        .bind(input.luggage_capacity)
        .bind(&input.image_urls)
        .bind(input.is_available)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query::write_error(&VEHICLES, e))?;

        query::fetch_existing(&self.pool, &VEHICLES, id).await
    }

    async fn update(
        &self,
        id: Uuid,
        input: &VehicleInput,
        scope: OwnerScope,
    ) -> AppResult<Option<Vehicle>> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            "UPDATE vehicles SET make = $2, model = $3, year = $4, registration_number = $5, \
             color = $6, category_id = $7, vehicle_type_id = $8, fuel_type = $9, \
             transmission = $10, seats = $11, luggage_capacity = $12, image_urls = $13, \
             is_available = $14, updated_at = NOW() \
             WHERE id = $1 AND ($15::uuid IS NULL OR business_id = $15) RETURNING id",
        )
        .bind(id)
        .bind(&input.make)
        .bind(&input.model)
        .bind(input.year)
        .bind(&input.registration_number)
        .bind(&input.color)
        .bind(input.category_id)
        .bind(input.vehicle_type_id)
        .bind(input.fuel_type)
        .bind(input.transmission)
        .bind(input.seats)
        .bind(input.luggage_capacity)
        .bind(&input.image_urls)
        .bind(input.is_available)
        .bind(scope.owner())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query::write_error(&VEHICLES, e))?;

        match updated {
            Some(id) => query::fetch_existing(&self.pool, &VEHICLES, id).await.map(Some),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, scope: OwnerScope) -> AppResult<bool> {
        query::delete_one(&self.pool, &VEHICLES, id, scope).await
    }

    async fn toggle_availability(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Vehicle>> {
        if !query::toggle(&self.pool, &VEHICLES, id, "is_available", scope).await? {
            return Ok(None);
        }
        query::fetch_by_id(&self.pool, &VEHICLES, id, scope).await
    }

    async fn bulk_set_availability(
        &self,
        ids: &BulkIds,
        available: bool,
        scope: OwnerScope,
    ) -> AppResult<u64> {
        sqlx::query(
            "UPDATE vehicles SET is_available = $2, updated_at = NOW() \
             WHERE id = ANY($1) AND ($3::uuid IS NULL OR business_id = $3)",
        )
        .bind(ids.as_slice())
        .bind(available)
        .bind(scope.owner())
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected())
        .map_err(|e| query::write_error(&VEHICLES, e))
    }

    async fn bulk_delete(&self, ids: &BulkIds, scope: OwnerScope) -> AppResult<u64> {
        query::delete_many(&self.pool, &VEHICLES, ids.as_slice(), scope).await
    }
}

impl Record for Vehicle {
    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        Some(match name {
            "id" => self.id.into(),
            "make" => self.make.as_str().into(),
            "model" => self.model.as_str().into(),
            "registration_number" => self.registration_number.as_str().into(),
            "business_id" => self.business_id.into(),
            "category_id" => self.category_id.into(),
            "vehicle_type_id" => self.vehicle_type_id.into(),
            "fuel_type" => self.fuel_type.as_str().into(),
            "transmission" => self.transmission.as_str().into(),
            "is_available" => self.is_available.into(),
            "year" => self.year.into(),
            "seats" => self.seats.into(),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }

    fn owner(&self) -> Option<Uuid> {
        Some(self.business_id)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// In-memory implementation.
#[derive(Debug, Clone)]
pub struct MemoryVehicleRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryVehicleRepository {
    /// Create a repository over the shared in-memory tables.
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }

    fn joined(&self, mut vehicle: Vehicle) -> Vehicle {
        vehicle.business_name = self.db.business_name(vehicle.business_id);
        vehicle.category_name = self.db.vehicle_category_name(vehicle.category_id);
        vehicle.vehicle_type_name = self.db.vehicle_type_name(vehicle.vehicle_type_id);
        vehicle
    }

    fn ensure_unique_plate(&self, plate: &str, except: Option<Uuid>) -> AppResult<()> {
        let taken = self
            .db
            .vehicles
            .any(|v| v.registration_number == plate && Some(v.id) != except);
        if taken {
            return Err(AppError::conflict(messages::DUPLICATE_REGISTRATION));
        }
        Ok(())
    }
}

#[async_trait]
impl ListRepository<Vehicle> for MemoryVehicleRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<Vehicle>> {
        let rows = self
            .db
            .vehicles
            .visible(scope)
            .into_iter()
            .map(|v| self.joined(v))
            .collect();
        paginate(rows, query)
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Vehicle>> {
        Ok(self.db.vehicles.get(id, scope).map(|v| self.joined(v)))
    }
}

#[async_trait]
impl VehicleRepository for MemoryVehicleRepository {
    async fn create(&self, business_id: Uuid, input: &VehicleInput) -> AppResult<Vehicle> {
        self.ensure_unique_plate(&input.registration_number, None)?;
        let now = Utc::now();
        let vehicle = self.db.vehicles.insert(Vehicle {
            id: Uuid::new_v4(),
            business_id,
            make: input.make.clone(),
            model: input.model.clone(),
            year: input.year,
            registration_number: input.registration_number.clone(),
            color: input.color.clone(),
            category_id: input.category_id,
            vehicle_type_id: input.vehicle_type_id,
            fuel_type: input.fuel_type,
            transmission: input.transmission,
            seats: input.seats,
            luggage_capacity: input.luggage_capacity,
            image_urls: input.image_urls.clone(),
            is_available: input.is_available,
            created_at: now,
            updated_at: now,
            business_name: None,
            category_name: None,
            vehicle_type_name: None,
        });
        Ok(self.joined(vehicle))
    }

    async fn update(
        &self,
        id: Uuid,
        input: &VehicleInput,
        scope: OwnerScope,
    ) -> AppResult<Option<Vehicle>> {
        self.ensure_unique_plate(&input.registration_number, Some(id))?;
        Ok(self
            .db
            .vehicles
            .update(id, scope, |v| {
                v.make = input.make.clone();
                v.model = input.model.clone();
                v.year = input.year;
                v.registration_number = input.registration_number.clone();
                v.color = input.color.clone();
                v.category_id = input.category_id;
                v.vehicle_type_id = input.vehicle_type_id;
                v.fuel_type = input.fuel_type;
                v.transmission = input.transmission;
                v.seats = input.seats;
                v.luggage_capacity = input.luggage_capacity;
                v.image_urls = input.image_urls.clone();
                v.is_available = input.is_available;
            })
            .map(|v| self.joined(v)))
    }

    async fn delete(&self, id: Uuid, scope: OwnerScope) -> AppResult<bool> {
        Ok(self.db.vehicles.remove_many(&[id], scope) > 0)
    }

    async fn toggle_availability(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Vehicle>> {
        Ok(self
            .db
            .vehicles
            .update(id, scope, |v| v.is_available = !v.is_available)
            .map(|v| self.joined(v)))
    }

    async fn bulk_set_availability(
        &self,
        ids: &BulkIds,
        available: bool,
        scope: OwnerScope,
    ) -> AppResult<u64> {
        Ok(self
            .db
            .vehicles
            .update_many(ids.as_slice(), scope, |v| v.is_available = available))
    }

    async fn bulk_delete(&self, ids: &BulkIds, scope: OwnerScope) -> AppResult<u64> {
        Ok(self.db.vehicles.remove_many(ids.as_slice(), scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdesk_core::error::ErrorKind;
    use fleetdesk_entity::vehicle::{FuelType, Transmission};

    fn input(plate: &str) -> VehicleInput {
        VehicleInput {
            business_id: None,
            make: "Toyota".into(),
            model: "Alphard".into(),
            year: 2023,
            registration_number: plate.into(),
            color: Some("Black".into()),
            category_id: None,
            vehicle_type_id: None,
            fuel_type: FuelType::Hybrid,
            transmission: Transmission::Automatic,
            seats: 6,
            luggage_capacity: 4,
            image_urls: Vec::new(),
            is_available: true,
        }
    }

    #[tokio::test]
    async fn test_toggle_flips_only_availability() {
        let db = Arc::new(MemoryDatabase::new());
        let vendor = db.add_business("Bali Transfers");
        let repo = MemoryVehicleRepository::new(db);
        let created = repo.create(vendor, &input("DK 1 AB")).await.unwrap();
        assert_eq!(created.business_name.as_deref(), Some("Bali Transfers"));

        let toggled = repo
            .toggle_availability(created.id, OwnerScope::Owner(vendor))
            .await
            .unwrap()
            .unwrap();
        assert!(!toggled.is_available);
        assert!(toggled.updated_at >= created.updated_at);
        assert_eq!(toggled.make, created.make);
        assert_eq!(toggled.seats, created.seats);
    }

    #[tokio::test]
    async fn test_duplicate_plate_conflicts() {
        let db = Arc::new(MemoryDatabase::new());
        let vendor = db.add_business("Bali Transfers");
        let repo = MemoryVehicleRepository::new(db);
        repo.create(vendor, &input("DK 1 AB")).await.unwrap();
        let err = repo.create(vendor, &input("DK 1 AB")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_other_vendor_cannot_delete() {
        let db = Arc::new(MemoryDatabase::new());
        let vendor = db.add_business("Bali Transfers");
        let rival = db.add_business("Java Rides");
        let repo = MemoryVehicleRepository::new(db);
        let created = repo.create(vendor, &input("DK 2 AB")).await.unwrap();

        assert!(!repo.delete(created.id, OwnerScope::Owner(rival)).await.unwrap());
        assert!(repo.find_by_id(created.id, OwnerScope::All).await.unwrap().is_some());
    }
}
