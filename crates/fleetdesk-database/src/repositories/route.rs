//! Route repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use fleetdesk_core::error::AppError;
use fleetdesk_core::result::AppResult;
use fleetdesk_core::traits::ListRepository;
use fleetdesk_core::types::{FilterValue, ListQuery, OwnerScope, PageResponse};
use fleetdesk_entity::route::{CreatorType, Route, RouteInput};

use super::booking::decimal;
use crate::memory::table::paginate;
use crate::memory::{MemoryDatabase, Record};
use crate::query::{self, Table, messages};

/// Route reads and writes. A vendor scope matches only routes the vendor
/// created itself.
#[async_trait]
pub trait RouteRepository: ListRepository<Route> {
    /// Insert a route.
    async fn create(
        &self,
        slug: &str,
        input: &RouteInput,
        created_by: Uuid,
        created_by_type: CreatorType,
    ) -> AppResult<Route>;

    /// Replace a route's editable columns.
    async fn update(
        &self,
        id: Uuid,
        slug: &str,
        input: &RouteInput,
        scope: OwnerScope,
    ) -> AppResult<Option<Route>>;

    /// Delete one route.
    async fn delete(&self, id: Uuid, scope: OwnerScope) -> AppResult<bool>;

    /// Flip `is_active`.
    async fn toggle_active(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Route>>;

    /// Flip `is_popular`.
    async fn toggle_popular(&self, id: Uuid) -> AppResult<Option<Route>>;
}

pub(crate) const ROUTES: Table = Table {
    name: "routes",
    alias: "r",
    columns: "r.*, lo.name AS origin_name, ld.name AS destination_name",
    from: "FROM routes r \
           LEFT JOIN locations lo ON lo.id = r.origin_location_id \
           LEFT JOIN locations ld ON ld.id = r.destination_location_id",
    fields: &[
        ("id", "r.id"),
        ("route_name", "r.route_name"),
        ("origin_name", "lo.name"),
        ("destination_name", "ld.name"),
        ("origin_location_id", "r.origin_location_id"),
        ("destination_location_id", "r.destination_location_id"),
        ("created_by_type", "r.created_by_type::text"),
        ("is_active", "r.is_active"),
        ("is_popular", "r.is_popular"),
        ("base_price", "r.base_price"),
        ("distance_km", "r.distance_km"),
        ("duration_minutes", "r.duration_minutes"),
        ("created_at", "r.created_at"),
    ],
    owner: Some("r.created_by_type = 'vendor' AND r.created_by = "),
};

/// PostgreSQL implementation.
#[derive(Debug, Clone)]
pub struct PgRouteRepository {
    pool: PgPool,
}

impl PgRouteRepository {
    /// Create a new route repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn refetch(&self, id: Uuid, scope: OwnerScope, matched: bool) -> AppResult<Option<Route>> {
        if !matched {
            return Ok(None);
        }
        query::fetch_by_id(&self.pool, &ROUTES, id, scope).await
    }
}

#[async_trait]
impl ListRepository<Route> for PgRouteRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<Route>> {
        query::fetch_page(&self.pool, &ROUTES, query, scope).await
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Route>> {
        query::fetch_by_id(&self.pool, &ROUTES, id, scope).await
    }
}

#[async_trait]
impl RouteRepository for PgRouteRepository {
    async fn create(
        &self,
        slug: &str,
        input: &RouteInput,
        created_by: Uuid,
        created_by_type: CreatorType,
    ) -> AppResult<Route> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO routes (id, origin_location_id, destination_location_id, route_name, \
             route_slug, distance_km, duration_minutes, base_price, is_active, is_shared, \
             created_by, created_by_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(input.origin_location_id)
        .bind(input.destination_location_id)
        .bind(&input.route_name)
        .bind(slug)
        .bind(input.distance_km)
        .bind(input.duration_minutes)
        .bind(input.base_price)
        .bind(input.is_active)
        .bind(input.is_shared)
        .bind(created_by)
        .bind(created_by_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query::write_error(&ROUTES, e))?;

        query::fetch_existing(&self.pool, &ROUTES, id).await
    }

    async fn update(
        &self,
        id: Uuid,
        slug: &str,
        input: &RouteInput,
        scope: OwnerScope,
    ) -> AppResult<Option<Route>> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE routes r SET origin_location_id = ");
        qb.push_bind(input.origin_location_id)
            .push(", destination_location_id = ")
            .push_bind(input.destination_location_id)
            .push(", route_name = ")
            .push_bind(input.route_name.clone())
            .push(", route_slug = ")
            .push_bind(slug.to_string())
            .push(", distance_km = ")
            .push_bind(input.distance_km)
            .push(", duration_minutes = ")
            .push_bind(input.duration_minutes)
            .push(", base_price = ")
            .push_bind(input.base_price)
            .push(", is_active = ")
            .push_bind(input.is_active)
            .push(", is_shared = ")
            .push_bind(input.is_shared)
            .push(", updated_at = NOW() WHERE r.id = ")
            .push_bind(id);
        ROUTES.push_scope(&mut qb, scope);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| query::write_error(&ROUTES, e))?;
        self.refetch(id, scope, result.rows_affected() > 0).await
    }

    async fn delete(&self, id: Uuid, scope: OwnerScope) -> AppResult<bool> {
        query::delete_one(&self.pool, &ROUTES, id, scope).await
    }

    async fn toggle_active(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Route>> {
        let matched = query::toggle(&self.pool, &ROUTES, id, "is_active", scope).await?;
        self.refetch(id, scope, matched).await
    }

    async fn toggle_popular(&self, id: Uuid) -> AppResult<Option<Route>> {
        let matched = query::toggle(&self.pool, &ROUTES, id, "is_popular", OwnerScope::All).await?;
        self.refetch(id, OwnerScope::All, matched).await
    }
}

impl Record for Route {
    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        Some(match name {
            "id" => self.id.into(),
            "route_name" => self.route_name.as_str().into(),
            "origin_name" => self.origin_name.clone().into(),
            "destination_name" => self.destination_name.clone().into(),
            "origin_location_id" => self.origin_location_id.into(),
            "destination_location_id" => self.destination_location_id.into(),
            "created_by_type" => self.created_by_type.as_str().into(),
            "is_active" => self.is_active.into(),
            "is_popular" => self.is_popular.into(),
            "base_price" => decimal(self.base_price),
            "distance_km" => decimal(self.distance_km),
            "duration_minutes" => self.duration_minutes.into(),
            "created_at" => self.created_at.into(),
            _ => return None,
        })
    }

    fn owner(&self) -> Option<Uuid> {
        (self.created_by_type == CreatorType::Vendor).then_some(self.created_by)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// In-memory implementation.
#[derive(Debug, Clone)]
pub struct MemoryRouteRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryRouteRepository {
    /// Create a repository over the shared in-memory tables.
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }

    fn joined(&self, mut route: Route) -> Route {
        route.origin_name = self.db.location_name(route.origin_location_id);
        route.destination_name = self.db.location_name(route.destination_location_id);
        route
    }

    fn check_write(&self, slug: &str, input: &RouteInput, except: Option<Uuid>) -> AppResult<()> {
        if self
            .db
            .routes
            .any(|r| r.route_slug == slug && Some(r.id) != except)
        {
            return Err(AppError::conflict(messages::DUPLICATE_SLUG));
        }
        let known = |id: Uuid| self.db.locations.contains_key(&id);
        if !known(input.origin_location_id) || !known(input.destination_location_id) {
            return Err(AppError::validation("A referenced record does not exist"));
        }
        Ok(())
    }
}

#[async_trait]
impl ListRepository<Route> for MemoryRouteRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<Route>> {
        let rows = self
            .db
            .routes
            .visible(scope)
            .into_iter()
            .map(|r| self.joined(r))
            .collect();
        paginate(rows, query)
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Route>> {
        Ok(self.db.routes.get(id, scope).map(|r| self.joined(r)))
    }
}

#[async_trait]
impl RouteRepository for MemoryRouteRepository {
    async fn create(
        &self,
        slug: &str,
        input: &RouteInput,
        created_by: Uuid,
        created_by_type: CreatorType,
    ) -> AppResult<Route> {
        self.check_write(slug, input, None)?;
        let now = Utc::now();
        let route = self.db.routes.insert(Route {
            id: Uuid::new_v4(),
            origin_location_id: input.origin_location_id,
            destination_location_id: input.destination_location_id,
            route_name: input.route_name.clone(),
            route_slug: slug.to_string(),
            distance_km: input.distance_km,
            duration_minutes: input.duration_minutes,
            base_price: input.base_price,
            is_active: input.is_active,
            is_popular: false,
            is_shared: input.is_shared,
            created_by,
            created_by_type,
            created_at: now,
            updated_at: now,
            origin_name: None,
            destination_name: None,
        });
        Ok(self.joined(route))
    }

    async fn update(
        &self,
        id: Uuid,
        slug: &str,
        input: &RouteInput,
        scope: OwnerScope,
    ) -> AppResult<Option<Route>> {
        self.check_write(slug, input, Some(id))?;
        Ok(self
            .db
            .routes
            .update(id, scope, |r| {
                r.origin_location_id = input.origin_location_id;
                r.destination_location_id = input.destination_location_id;
                r.route_name = input.route_name.clone();
                r.route_slug = slug.to_string();
                r.distance_km = input.distance_km;
                r.duration_minutes = input.duration_minutes;
                r.base_price = input.base_price;
                r.is_active = input.is_active;
                r.is_shared = input.is_shared;
            })
            .map(|r| self.joined(r)))
    }

    async fn delete(&self, id: Uuid, scope: OwnerScope) -> AppResult<bool> {
        Ok(self.db.routes.remove_many(&[id], scope) > 0)
    }

    async fn toggle_active(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Route>> {
        Ok(self
            .db
            .routes
            .update(id, scope, |r| r.is_active = !r.is_active)
            .map(|r| self.joined(r)))
    }

    async fn toggle_popular(&self, id: Uuid) -> AppResult<Option<Route>> {
        Ok(self
            .db
            .routes
            .update(id, OwnerScope::All, |r| r.is_popular = !r.is_popular)
            .map(|r| self.joined(r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn input(db: &MemoryDatabase) -> RouteInput {
        RouteInput {
            origin_location_id: db.add_location("Ngurah Rai Airport", None),
            destination_location_id: db.add_location("Ubud", None),
            route_name: "Airport to Ubud".into(),
            route_slug: None,
            distance_km: Decimal::new(375, 1),
            duration_minutes: 75,
            base_price: Decimal::new(3500, 2),
            is_active: true,
            is_shared: false,
        }
    }

    #[test]
    fn test_vendor_scope_predicate() {
        let qb = ROUTES.by_id_query(Uuid::new_v4(), OwnerScope::Owner(Uuid::new_v4()));
        assert!(
            qb.sql()
                .ends_with("AND r.created_by_type = 'vendor' AND r.created_by = $2")
        );
    }

    #[tokio::test]
    async fn test_vendor_cannot_touch_admin_routes() {
        let db = Arc::new(MemoryDatabase::new());
        let vendor = db.add_business("Bali Transfers");
        let input = input(&db);
        let repo = MemoryRouteRepository::new(db);

        let admin_route = repo
            .create("airport-to-ubud", &input, Uuid::new_v4(), CreatorType::Admin)
            .await
            .unwrap();
        assert_eq!(admin_route.origin_name.as_deref(), Some("Ngurah Rai Airport"));

        let toggled = repo
            .toggle_active(admin_route.id, OwnerScope::Owner(vendor))
            .await
            .unwrap();
        assert!(toggled.is_none());

        let own = repo
            .create("airport-to-ubud-2", &input, vendor, CreatorType::Vendor)
            .await
            .unwrap();
        let toggled = repo
            .toggle_active(own.id, OwnerScope::Owner(vendor))
            .await
            .unwrap()
            .unwrap();
        assert!(!toggled.is_active);
        assert!(!toggled.is_popular);
    }
}
