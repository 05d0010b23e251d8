//! Reference data: locations, zones, vehicle types and categories, and
//! zone-pair prices.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use fleetdesk_core::error::{AppError, ErrorKind};
use fleetdesk_core::result::AppResult;
use fleetdesk_core::types::{FilterValue, ListQuery, OwnerScope, PageResponse};
use fleetdesk_entity::reference::{
    Location, VehicleCategory, VehicleType, Zone, ZonePrice, ZonePriceInput,
};

use super::booking::decimal;
use crate::memory::table::paginate;
use crate::memory::{MemoryDatabase, Record};
use crate::query::{self, Table};

/// Read-mostly lookups used by forms and pricing.
#[async_trait]
pub trait ReferenceRepository: Send + Sync + 'static {
    /// Locations ordered by name.
    async fn list_locations(&self, active_only: bool) -> AppResult<Vec<Location>>;

    /// Zones ordered by name.
    async fn list_zones(&self) -> AppResult<Vec<Zone>>;

    /// Vehicle types ordered by name.
    async fn list_vehicle_types(&self) -> AppResult<Vec<VehicleType>>;

    /// Vehicle categories ordered by name.
    async fn list_vehicle_categories(&self) -> AppResult<Vec<VehicleCategory>>;

    /// One location.
    async fn find_location(&self, id: Uuid) -> AppResult<Option<Location>>;

    /// One vehicle type.
    async fn find_vehicle_type(&self, id: Uuid) -> AppResult<Option<VehicleType>>;

    /// The price between two zones, stored in either direction.
    async fn find_zone_price(&self, a: Uuid, b: Uuid) -> AppResult<Option<ZonePrice>>;

    /// Paginated zone prices.
    async fn list_zone_prices(&self, query: &ListQuery) -> AppResult<PageResponse<ZonePrice>>;

    /// Insert or replace the price of a zone pair.
    async fn upsert_zone_price(&self, input: &ZonePriceInput) -> AppResult<ZonePrice>;

    /// Delete one zone price.
    async fn delete_zone_price(&self, id: Uuid) -> AppResult<bool>;
}

/// A zone pair in storage order, so each unordered pair has one row.
pub fn zone_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

pub(crate) const ZONE_PRICES: Table = Table {
    name: "zone_prices",
    alias: "zp",
    columns: "zp.*, zo.name AS origin_zone_name, zd.name AS destination_zone_name",
    from: "FROM zone_prices zp \
           LEFT JOIN zones zo ON zo.id = zp.origin_zone_id \
           LEFT JOIN zones zd ON zd.id = zp.destination_zone_id",
    fields: &[
        ("id", "zp.id"),
        ("origin_zone_id", "zp.origin_zone_id"),
        ("destination_zone_id", "zp.destination_zone_id"),
        ("origin_zone_name", "zo.name"),
        ("destination_zone_name", "zd.name"),
        ("base_price", "zp.base_price"),
        ("created_at", "zp.created_at"),
    ],
    owner: None,
};

/// PostgreSQL implementation.
#[derive(Debug, Clone)]
pub struct PgReferenceRepository {
    pool: PgPool,
}

impl PgReferenceRepository {
    /// Create a new reference repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn lookup_error(what: &str, err: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, format!("Failed to load {what}"), err)
}

#[async_trait]
impl ReferenceRepository for PgReferenceRepository {
    async fn list_locations(&self, active_only: bool) -> AppResult<Vec<Location>> {
        sqlx::query_as::<_, Location>(
            "SELECT id, name, zone_id, is_active FROM locations \
             WHERE is_active OR NOT $1 ORDER BY name",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| lookup_error("locations", e))
    }

    async fn list_zones(&self) -> AppResult<Vec<Zone>> {
        sqlx::query_as::<_, Zone>("SELECT id, name FROM zones ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| lookup_error("zones", e))
    }

    async fn list_vehicle_types(&self) -> AppResult<Vec<VehicleType>> {
        sqlx::query_as::<_, VehicleType>(
            "SELECT id, name, max_passengers, price_multiplier FROM vehicle_types ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| lookup_error("vehicle types", e))
    }

    async fn list_vehicle_categories(&self) -> AppResult<Vec<VehicleCategory>> {
        sqlx::query_as::<_, VehicleCategory>("SELECT id, name FROM vehicle_categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| lookup_error("vehicle categories", e))
    }

    async fn find_location(&self, id: Uuid) -> AppResult<Option<Location>> {
        sqlx::query_as::<_, Location>(
            "SELECT id, name, zone_id, is_active FROM locations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| lookup_error("location", e))
    }

    async fn find_vehicle_type(&self, id: Uuid) -> AppResult<Option<VehicleType>> {
        sqlx::query_as::<_, VehicleType>(
            "SELECT id, name, max_passengers, price_multiplier FROM vehicle_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| lookup_error("vehicle type", e))
    }

    async fn find_zone_price(&self, a: Uuid, b: Uuid) -> AppResult<Option<ZonePrice>> {
        let (origin, destination) = zone_pair(a, b);
        let sql = format!(
            "SELECT {} {} WHERE (zp.origin_zone_id = $1 AND zp.destination_zone_id = $2) \
             OR (zp.origin_zone_id = $2 AND zp.destination_zone_id = $1) LIMIT 1",
            ZONE_PRICES.columns, ZONE_PRICES.from
        );
        sqlx::query_as::<_, ZonePrice>(&sql)
            .bind(origin)
            .bind(destination)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| lookup_error("zone price", e))
    }

    async fn list_zone_prices(&self, query: &ListQuery) -> AppResult<PageResponse<ZonePrice>> {
        query::fetch_page(&self.pool, &ZONE_PRICES, query, OwnerScope::All).await
    }

    async fn upsert_zone_price(&self, input: &ZonePriceInput) -> AppResult<ZonePrice> {
        let (origin, destination) = zone_pair(input.origin_zone_id, input.destination_zone_id);
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO zone_prices (id, origin_zone_id, destination_zone_id, base_price) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (origin_zone_id, destination_zone_id) \
             DO UPDATE SET base_price = EXCLUDED.base_price, updated_at = NOW() \
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(origin)
        .bind(destination)
        .bind(input.base_price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query::write_error(&ZONE_PRICES, e))?;

        query::fetch_existing(&self.pool, &ZONE_PRICES, id).await
    }

    async fn delete_zone_price(&self, id: Uuid) -> AppResult<bool> {
        query::delete_one(&self.pool, &ZONE_PRICES, id, OwnerScope::All).await
    }
}

impl Record for ZonePrice {
    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        Some(match name {
            "id" => self.id.into(),
            "origin_zone_id" => self.origin_zone_id.into(),
            "destination_zone_id" => self.destination_zone_id.into(),
            "origin_zone_name" => self.origin_zone_name.clone().into(),
            "destination_zone_name" => self.destination_zone_name.clone().into(),
            "base_price" => decimal(self.base_price),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// In-memory implementation.
#[derive(Debug, Clone)]
pub struct MemoryReferenceRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryReferenceRepository {
    /// Create a repository over the shared in-memory tables.
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }

    fn joined(&self, mut price: ZonePrice) -> ZonePrice {
        price.origin_zone_name = self.db.zone_name(price.origin_zone_id);
        price.destination_zone_name = self.db.zone_name(price.destination_zone_id);
        price
    }
}

fn sorted_by_name<T: Clone>(items: impl Iterator<Item = T>, name: impl Fn(&T) -> String) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| name(item).to_lowercase());
    items
}

#[async_trait]
impl ReferenceRepository for MemoryReferenceRepository {
    async fn list_locations(&self, active_only: bool) -> AppResult<Vec<Location>> {
        Ok(sorted_by_name(
            self.db
                .locations
                .iter()
                .map(|l| l.value().clone())
                .filter(|l| l.is_active || !active_only),
            |l| l.name.clone(),
        ))
    }

    async fn list_zones(&self) -> AppResult<Vec<Zone>> {
        Ok(sorted_by_name(
            self.db.zones.iter().map(|z| z.value().clone()),
            |z| z.name.clone(),
        ))
    }

    async fn list_vehicle_types(&self) -> AppResult<Vec<VehicleType>> {
        Ok(sorted_by_name(
            self.db.vehicle_types.iter().map(|t| t.value().clone()),
            |t| t.name.clone(),
        ))
    }

    async fn list_vehicle_categories(&self) -> AppResult<Vec<VehicleCategory>> {
        Ok(sorted_by_name(
            self.db.vehicle_categories.iter().map(|c| c.value().clone()),
            |c| c.name.clone(),
        ))
    }

    async fn find_location(&self, id: Uuid) -> AppResult<Option<Location>> {
        Ok(self.db.locations.get(&id).map(|l| l.value().clone()))
    }

    async fn find_vehicle_type(&self, id: Uuid) -> AppResult<Option<VehicleType>> {
        Ok(self.db.vehicle_types.get(&id).map(|t| t.value().clone()))
    }

    async fn find_zone_price(&self, a: Uuid, b: Uuid) -> AppResult<Option<ZonePrice>> {
        Ok(self
            .db
            .zone_prices
            .visible(OwnerScope::All)
            .into_iter()
            .find(|p| {
                (p.origin_zone_id == a && p.destination_zone_id == b)
                    || (p.origin_zone_id == b && p.destination_zone_id == a)
            })
            .map(|p| self.joined(p)))
    }

    async fn list_zone_prices(&self, query: &ListQuery) -> AppResult<PageResponse<ZonePrice>> {
        let rows = self
            .db
            .zone_prices
            .visible(OwnerScope::All)
            .into_iter()
            .map(|p| self.joined(p))
            .collect();
        paginate(rows, query)
    }

    async fn upsert_zone_price(&self, input: &ZonePriceInput) -> AppResult<ZonePrice> {
        let (origin, destination) = zone_pair(input.origin_zone_id, input.destination_zone_id);
        if !self.db.zones.contains_key(&origin) || !self.db.zones.contains_key(&destination) {
            return Err(AppError::validation("A referenced record does not exist"));
        }

        if let Some(existing) = self.find_zone_price(origin, destination).await? {
            let updated = self
                .db
                .zone_prices
                .update(existing.id, OwnerScope::All, |p| p.base_price = input.base_price)
                .ok_or_else(|| AppError::not_found("Zone price not found"))?;
            return Ok(self.joined(updated));
        }

        let now = Utc::now();
        let price = self.db.zone_prices.insert(ZonePrice {
            id: Uuid::new_v4(),
            origin_zone_id: origin,
            destination_zone_id: destination,
            base_price: input.base_price,
            created_at: now,
            updated_at: now,
            origin_zone_name: None,
            destination_zone_name: None,
        });
        Ok(self.joined(price))
    }

    async fn delete_zone_price(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.db.zone_prices.remove_many(&[id], OwnerScope::All) > 0)
    }
}
