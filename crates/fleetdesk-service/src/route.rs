//! Transfer routes.
//!
//! Admins manage every route. A vendor manages only the routes their
//! business created; routes made by admins or other vendors stay out of
//! their scope entirely. Promoting a route to "popular" is admin-only.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use fleetdesk_auth::{RbacEnforcer, RequestContext, SystemPermission, UserRole};
use fleetdesk_cache::Revalidator;
use fleetdesk_core::error::AppError;
use fleetdesk_core::types::{ListFilter, OwnerScope, PageResponse};
use fleetdesk_database::repositories::{ReferenceRepository, RouteRepository};
use fleetdesk_entity::route::{CreatorType, Route, RouteFilter, RouteInput};

use crate::paths;
use crate::support::{found, owned, scoped_miss, slug_for, validate};

/// Manages transfer routes.
#[derive(Clone)]
pub struct RouteService {
    /// Route repository.
    repo: Arc<dyn RouteRepository>,
    /// Locations, for existence checks.
    reference: Arc<dyn ReferenceRepository>,
    /// Page cache.
    pages: Revalidator,
    /// Permission checks.
    rbac: Arc<RbacEnforcer>,
}

impl RouteService {
    /// Creates a new route service.
    pub fn new(
        repo: Arc<dyn RouteRepository>,
        reference: Arc<dyn ReferenceRepository>,
        pages: Revalidator,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            repo,
            reference,
            pages,
            rbac,
        }
    }

    /// Lists the routes the caller manages.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &RouteFilter,
    ) -> Result<PageResponse<Route>, AppError> {
        self.rbac.require(ctx, SystemPermission::RouteView)?;
        let scope = ctx.owner_scope()?;
        let query = filter.to_list_query();
        let path = match scope {
            OwnerScope::All => paths::ADMIN_ROUTES,
            OwnerScope::Owner(_) => paths::VENDOR_ROUTES,
        };
        self.pages
            .cached(path, &(&query, scope), &[], || self.repo.list(&query, scope))
            .await
    }

    /// Gets one route.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Route, AppError> {
        self.rbac.require(ctx, SystemPermission::RouteView)?;
        let scope = ctx.owner_scope()?;
        found(self.repo.find_by_id(id, scope).await?, "Route")
    }

    /// Active routes for the public site.
    pub async fn public_list(&self, filter: RouteFilter) -> Result<PageResponse<Route>, AppError> {
        let query = filter.public().to_list_query();
        self.pages
            .cached(paths::PUBLIC_ROUTES, &query, &[], || {
                self.repo.list(&query, OwnerScope::All)
            })
            .await
    }

    /// Creates a route owned by the caller's account.
    pub async fn create(&self, ctx: &RequestContext, input: RouteInput) -> Result<Route, AppError> {
        self.rbac.require(ctx, SystemPermission::RouteManage)?;
        let (created_by, creator_type) = match ctx.role {
            UserRole::Admin => (ctx.user_id, CreatorType::Admin),
            _ => (ctx.require_vendor()?, CreatorType::Vendor),
        };
        let (slug, input) = self.prepare(input).await?;

        let route = self.repo.create(&slug, &input, created_by, creator_type).await?;
        self.revalidate(route.id).await;

        info!(
            user_id = %ctx.user_id,
            route_id = %route.id,
            slug = %route.route_slug,
            created_by_type = %creator_type,
            "Route created"
        );
        Ok(route)
    }

    /// Replaces a route's fields.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: RouteInput,
    ) -> Result<Route, AppError> {
        self.rbac.require(ctx, SystemPermission::RouteManage)?;
        let scope = ctx.owner_scope()?;
        let (slug, input) = self.prepare(input).await?;

        let updated = self.repo.update(id, &slug, &input, scope).await?;
        let route = owned(updated, &*self.repo, id, scope, "Route").await?;
        self.revalidate(id).await;

        info!(user_id = %ctx.user_id, route_id = %id, "Route updated");
        Ok(route)
    }

    /// Deletes a route.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        self.rbac.require(ctx, SystemPermission::RouteManage)?;
        let scope = ctx.owner_scope()?;

        if !self.repo.delete(id, scope).await? {
            return Err(scoped_miss::<Route, _>(&*self.repo, id, scope, "Route").await);
        }
        self.revalidate(id).await;

        info!(user_id = %ctx.user_id, route_id = %id, "Route deleted");
        Ok(())
    }

    /// Flips `is_active`.
    pub async fn toggle_active(&self, ctx: &RequestContext, id: Uuid) -> Result<Route, AppError> {
        self.rbac.require(ctx, SystemPermission::RouteManage)?;
        let scope = ctx.owner_scope()?;

        let toggled = self.repo.toggle_active(id, scope).await?;
        let route = owned(toggled, &*self.repo, id, scope, "Route").await?;
        self.revalidate(id).await;

        info!(
            user_id = %ctx.user_id,
            route_id = %id,
            is_active = route.is_active,
            "Route active flag toggled"
        );
        Ok(route)
    }

    /// Flips `is_popular`.
    pub async fn toggle_popular(&self, ctx: &RequestContext, id: Uuid) -> Result<Route, AppError> {
        self.rbac.require(ctx, SystemPermission::RoutePromote)?;

        let route = found(self.repo.toggle_popular(id).await?, "Route")?;
        self.revalidate(id).await;

        info!(
            admin_id = %ctx.user_id,
            route_id = %id,
            is_popular = route.is_popular,
            "Route popular flag toggled"
        );
        Ok(route)
    }

    async fn prepare(&self, mut input: RouteInput) -> Result<(String, RouteInput), AppError> {
        input.route_name = input.route_name.trim().to_string();
        validate(&input)?;
        if input.origin_location_id == input.destination_location_id {
            return Err(AppError::invalid_field(
                "destination_location_id",
                "Destination must differ from the origin",
            ));
        }
        for (field, id) in [
            ("origin_location_id", input.origin_location_id),
            ("destination_location_id", input.destination_location_id),
        ] {
            if self.reference.find_location(id).await?.is_none() {
                return Err(AppError::invalid_field(field, "Location does not exist"));
            }
        }
        let slug = slug_for("route_slug", input.route_slug.as_deref(), &input.route_name)?;
        Ok((slug, input))
    }

    async fn revalidate(&self, id: Uuid) {
        let admin_detail = paths::detail(paths::ADMIN_ROUTES, id);
        let vendor_detail = paths::detail(paths::VENDOR_ROUTES, id);
        self.pages
            .revalidate_paths(&[
                paths::ADMIN_ROUTES,
                &admin_detail,
                paths::VENDOR_ROUTES,
                &vendor_detail,
                paths::PUBLIC_ROUTES,
            ])
            .await;
    }
}

#[cfg(test)]
mod tests {
    use fleetdesk_core::error::ErrorKind;
    use rust_decimal::Decimal;

    use super::*;
    use crate::testing::Fixture;

    fn input(fx: &Fixture, name: &str) -> RouteInput {
        RouteInput {
            origin_location_id: fx.db.add_location("Ngurah Rai Airport", None),
            destination_location_id: fx.db.add_location("Ubud Centre", None),
            route_name: name.into(),
            route_slug: None,
            distance_km: Decimal::new(375, 1),
            duration_minutes: 75,
            base_price: Decimal::new(30_00, 2),
            is_active: true,
            is_shared: false,
        }
    }

    #[tokio::test]
    async fn test_vendor_owns_created_route() {
        let fx = Fixture::new().await;
        let vendor = fx.vendor("Bali Rides");
        let route = fx
            .services
            .routes
            .create(&vendor, input(&fx, "Airport to Ubud"))
            .await
            .unwrap();
        assert_eq!(route.route_slug, "airport-to-ubud");
        assert_eq!(route.created_by_type, CreatorType::Vendor);
        assert!(route.is_owned_by_vendor(vendor.business_id.unwrap()));
    }

    #[tokio::test]
    async fn test_vendor_cannot_edit_admin_route() {
        let fx = Fixture::new().await;
        let vendor = fx.vendor("Bali Rides");
        let svc = &fx.services.routes;
        let route = svc
            .create(&fx.admin, input(&fx, "Airport to Kuta"))
            .await
            .unwrap();

        let err = svc.toggle_active(&vendor, route.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let err = svc.delete(&vendor, route.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(svc.get(&fx.admin, route.id).await.unwrap().is_active);

        let page = svc.list(&vendor, &RouteFilter::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_popular_is_admin_only() {
        let fx = Fixture::new().await;
        let vendor = fx.vendor("Bali Rides");
        let svc = &fx.services.routes;
        let route = svc
            .create(&vendor, input(&fx, "Airport to Canggu"))
            .await
            .unwrap();

        let err = svc.toggle_popular(&vendor, route.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let promoted = svc.toggle_popular(&fx.admin, route.id).await.unwrap();
        assert!(promoted.is_popular);
        assert_eq!(promoted.is_active, route.is_active);
    }

    #[tokio::test]
    async fn test_same_origin_and_destination() {
        let fx = Fixture::new().await;
        let mut form = input(&fx, "Nowhere Fast");
        form.destination_location_id = form.origin_location_id;

        let err = fx
            .services
            .routes
            .create(&fx.admin, form)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_unknown_location() {
        let fx = Fixture::new().await;
        let mut form = input(&fx, "Airport to Nowhere");
        form.destination_location_id = Uuid::new_v4();

        let err = fx
            .services
            .routes
            .create(&fx.admin, form)
            .await
            .unwrap_err();
        assert!(err.details.unwrap().get("destination_location_id").is_some());
    }
}
