//! Vehicle fleet management.
//!
//! Vehicles belong to one vendor. Vendors manage their own fleet; admins
//! manage every fleet and name the owning business when they create one.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use fleetdesk_auth::{RbacEnforcer, RequestContext, SystemPermission, UserRole};
use fleetdesk_cache::Revalidator;
use fleetdesk_core::error::AppError;
use fleetdesk_core::types::{BulkIds, ListFilter, OwnerScope, PageResponse};
use fleetdesk_database::repositories::VehicleRepository;
use fleetdesk_entity::vehicle::{Vehicle, VehicleFilter, VehicleInput};
use fleetdesk_storage::MediaStore;

use crate::paths;
use crate::support::{found, owned, scoped_miss, validate};

const IMAGE_FOLDER: &str = "vehicles";

/// Manages vehicles.
#[derive(Clone)]
pub struct VehicleService {
    /// Vehicle repository.
    repo: Arc<dyn VehicleRepository>,
    /// Image storage.
    media: MediaStore,
    /// Page cache.
    pages: Revalidator,
    /// Permission checks.
    rbac: Arc<RbacEnforcer>,
}

impl VehicleService {
    /// Creates a new vehicle service.
    pub fn new(
        repo: Arc<dyn VehicleRepository>,
        media: MediaStore,
        pages: Revalidator,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            repo,
            media,
            pages,
            rbac,
        }
    }

    /// Lists the caller's vehicles.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &VehicleFilter,
    ) -> Result<PageResponse<Vehicle>, AppError> {
        self.rbac.require(ctx, SystemPermission::VehicleView)?;
        let scope = ctx.owner_scope()?;
        let query = filter.to_list_query();
        let path = match scope {
            OwnerScope::All => paths::ADMIN_VEHICLES,
            OwnerScope::Owner(_) => paths::VENDOR_VEHICLES,
        };

        self.pages
            .cached(path, &(&query, scope), &[], || self.repo.list(&query, scope))
            .await
    }

    /// Gets one vehicle.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Vehicle, AppError> {
        self.rbac.require(ctx, SystemPermission::VehicleView)?;
        let scope = ctx.owner_scope()?;
        found(self.repo.find_by_id(id, scope).await?, "Vehicle")
    }

    /// Creates a vehicle.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        mut input: VehicleInput,
    ) -> Result<Vehicle, AppError> {
        self.rbac.require(ctx, SystemPermission::VehicleManage)?;
        let business_id = match ctx.role {
            UserRole::Admin => input.business_id.ok_or_else(|| {
                AppError::invalid_field("business_id", "Select the business that owns this vehicle")
            })?,
            _ => ctx.require_vendor()?,
        };
        input.normalize();
        validate(&input)?;
        input.image_urls = self
            .media
            .resolve_images(std::mem::take(&mut input.image_urls), IMAGE_FOLDER)
            .await?;

        let vehicle = self.repo.create(business_id, &input).await?;
        self.revalidate(vehicle.id).await;

        info!(
            user_id = %ctx.user_id,
            vehicle_id = %vehicle.id,
            business_id = %business_id,
            registration = %vehicle.registration_number,
            "Vehicle created"
        );
        Ok(vehicle)
    }

    /// Replaces a vehicle's fields. The owning business does not change.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        mut input: VehicleInput,
    ) -> Result<Vehicle, AppError> {
        self.rbac.require(ctx, SystemPermission::VehicleManage)?;
        let scope = ctx.owner_scope()?;
        input.normalize();
        validate(&input)?;
        input.image_urls = self
            .media
            .resolve_images(std::mem::take(&mut input.image_urls), IMAGE_FOLDER)
            .await?;

        let updated = self.repo.update(id, &input, scope).await?;
        let vehicle = owned(updated, &*self.repo, id, scope, "Vehicle").await?;
        self.revalidate(id).await;

        info!(user_id = %ctx.user_id, vehicle_id = %id, "Vehicle updated");
        Ok(vehicle)
    }

    /// Deletes a vehicle.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        self.rbac.require(ctx, SystemPermission::VehicleManage)?;
        let scope = ctx.owner_scope()?;

        if !self.repo.delete(id, scope).await? {
            return Err(scoped_miss::<Vehicle, _>(&*self.repo, id, scope, "Vehicle").await);
        }
        self.revalidate(id).await;

        info!(user_id = %ctx.user_id, vehicle_id = %id, "Vehicle deleted");
        Ok(())
    }

    /// Flips `is_available`.
    pub async fn toggle_availability(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Vehicle, AppError> {
        self.rbac.require(ctx, SystemPermission::VehicleManage)?;
        let scope = ctx.owner_scope()?;

        let toggled = self.repo.toggle_availability(id, scope).await?;
        let vehicle = owned(toggled, &*self.repo, id, scope, "Vehicle").await?;
        self.revalidate(id).await;

        info!(
            user_id = %ctx.user_id,
            vehicle_id = %id,
            is_available = vehicle.is_available,
            "Vehicle availability toggled"
        );
        Ok(vehicle)
    }

    /// Sets availability on many vehicles. Returns the number changed.
    pub async fn bulk_set_availability(
        &self,
        ctx: &RequestContext,
        ids: &BulkIds,
        available: bool,
    ) -> Result<u64, AppError> {
        self.rbac.require(ctx, SystemPermission::VehicleManage)?;
        let scope = ctx.owner_scope()?;

        let updated = self.repo.bulk_set_availability(ids, available, scope).await?;
        self.revalidate_lists().await;

        info!(
            user_id = %ctx.user_id,
            requested = ids.len(),
            updated,
            available,
            "Bulk vehicle availability update"
        );
        Ok(updated)
    }

    /// Deletes many vehicles. Returns the number removed.
    pub async fn bulk_delete(&self, ctx: &RequestContext, ids: &BulkIds) -> Result<u64, AppError> {
        self.rbac.require(ctx, SystemPermission::VehicleManage)?;
        let scope = ctx.owner_scope()?;

        let deleted = self.repo.bulk_delete(ids, scope).await?;
        self.revalidate_lists().await;

        info!(user_id = %ctx.user_id, requested = ids.len(), deleted, "Bulk vehicle delete");
        Ok(deleted)
    }

    async fn revalidate(&self, id: Uuid) {
        let admin_detail = paths::detail(paths::ADMIN_VEHICLES, id);
        let vendor_detail = paths::detail(paths::VENDOR_VEHICLES, id);
        self.pages
            .revalidate_paths(&[
                paths::ADMIN_VEHICLES,
                &admin_detail,
                paths::VENDOR_VEHICLES,
                &vendor_detail,
            ])
            .await;
    }

    async fn revalidate_lists(&self) {
        self.pages
            .revalidate_paths(&[paths::ADMIN_VEHICLES, paths::VENDOR_VEHICLES])
            .await;
    }
}

#[cfg(test)]
mod tests {
    use fleetdesk_core::error::ErrorKind;
    use fleetdesk_entity::vehicle::{FuelType, Transmission};

    use super::*;
    use crate::testing::Fixture;

    fn input(plate: &str) -> VehicleInput {
        VehicleInput {
            business_id: None,
            make: "Toyota".into(),
            model: "Innova".into(),
            year: 2021,
            registration_number: plate.into(),
            color: None,
            category_id: None,
            vehicle_type_id: None,
            fuel_type: FuelType::Diesel,
            transmission: Transmission::Automatic,
            seats: 6,
            luggage_capacity: 4,
            image_urls: Vec::new(),
            is_available: true,
        }
    }

    #[tokio::test]
    async fn test_admin_must_name_business() {
        let fx = Fixture::new().await;
        let err = fx
            .services
            .vehicles
            .create(&fx.admin, input("DK 1001 AA"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.details.unwrap().get("business_id").is_some());
    }

    #[tokio::test]
    async fn test_vendor_creates_in_own_fleet() {
        let fx = Fixture::new().await;
        let vendor = fx.vendor("Bali Rides");
        let mut form = input("dk 1002 bb");
        form.business_id = Some(Uuid::new_v4());

        let vehicle = fx.services.vehicles.create(&vendor, form).await.unwrap();
        assert_eq!(Some(vehicle.business_id), vendor.business_id);
        assert_eq!(vehicle.registration_number, "DK 1002 BB");
    }

    #[tokio::test]
    async fn test_toggle_flips_only_availability() {
        let fx = Fixture::new().await;
        let vendor = fx.vendor("Bali Rides");
        let before = fx
            .services
            .vehicles
            .create(&vendor, input("DK 1003 CC"))
            .await
            .unwrap();

        let after = fx
            .services
            .vehicles
            .toggle_availability(&vendor, before.id)
            .await
            .unwrap();
        assert!(!after.is_available);
        assert_eq!(after.seats, before.seats);
        assert_eq!(after.registration_number, before.registration_number);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_other_vendor_cannot_delete() {
        let fx = Fixture::new().await;
        let owner = fx.vendor("Bali Rides");
        let other = fx.vendor("Lombok Transfers");
        let vehicle = fx
            .services
            .vehicles
            .create(&owner, input("DK 1004 DD"))
            .await
            .unwrap();

        let err = fx
            .services
            .vehicles
            .delete(&other, vehicle.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(fx.db.vehicles.get(vehicle.id, OwnerScope::All).is_some());
    }

    #[tokio::test]
    async fn test_other_vendor_cannot_toggle() {
        let fx = Fixture::new().await;
        let owner = fx.vendor("Bali Rides");
        let other = fx.vendor("Lombok Transfers");
        let vehicle = fx
            .services
            .vehicles
            .create(&owner, input("DK 1006 FF"))
            .await
            .unwrap();

        let err = fx
            .services
            .vehicles
            .toggle_availability(&other, vehicle.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(err.message, "Unauthorized");
        let row = fx.db.vehicles.get(vehicle.id, OwnerScope::All).unwrap();
        assert!(row.is_available);
        assert_eq!(row.updated_at, vehicle.updated_at);
    }

    #[tokio::test]
    async fn test_missing_vehicle_is_not_found() {
        let fx = Fixture::new().await;
        let vendor = fx.vendor("Bali Rides");
        let err = fx
            .services
            .vehicles
            .toggle_availability(&vendor, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_inline_image_is_uploaded() {
        let fx = Fixture::new().await;
        let vendor = fx.vendor("Bali Rides");
        let mut form = input("DK 1005 EE");
        form.image_urls = vec!["data:image/png;base64,iVBORw0KGgo=".into()];

        let vehicle = fx.services.vehicles.create(&vendor, form).await.unwrap();
        assert_eq!(vehicle.image_urls.len(), 1);
        assert!(vehicle.image_urls[0].contains("/vehicles/"));
        assert!(vehicle.image_urls[0].ends_with(".png"));
    }
}
