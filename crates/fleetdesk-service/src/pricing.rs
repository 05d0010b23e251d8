//! Zone pricing, public quotes, and the reference lists forms pick from.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use fleetdesk_auth::{RbacEnforcer, RequestContext, SystemPermission};
use fleetdesk_cache::Revalidator;
use fleetdesk_core::error::AppError;
use fleetdesk_core::types::{ListFilter, PageResponse};
use fleetdesk_database::repositories::ReferenceRepository;
use fleetdesk_entity::reference::{
    Location, Quote, QuoteRequest, VehicleCategory, VehicleType, Zone, ZonePrice, ZonePriceFilter,
    ZonePriceInput,
};

use crate::paths;
use crate::support::validate;

/// Select options for admin and vendor forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormOptions {
    pub locations: Vec<Location>,
    pub zones: Vec<Zone>,
    pub vehicle_types: Vec<VehicleType>,
    pub vehicle_categories: Vec<VehicleCategory>,
}

/// Zone prices and quotes.
#[derive(Clone)]
pub struct PricingService {
    /// Reference data repository.
    reference: Arc<dyn ReferenceRepository>,
    /// Page cache.
    pages: Revalidator,
    /// Permission checks.
    rbac: Arc<RbacEnforcer>,
}

impl PricingService {
    /// Creates a new pricing service.
    pub fn new(
        reference: Arc<dyn ReferenceRepository>,
        pages: Revalidator,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            reference,
            pages,
            rbac,
        }
    }

    /// Lists zone-pair prices.
    pub async fn list_zone_prices(
        &self,
        ctx: &RequestContext,
        filter: &ZonePriceFilter,
    ) -> Result<PageResponse<ZonePrice>, AppError> {
        self.rbac.require(ctx, SystemPermission::PricingManage)?;
        let query = filter.to_list_query();
        self.pages
            .cached(paths::ADMIN_ZONE_PRICES, &query, &[], || {
                self.reference.list_zone_prices(&query)
            })
            .await
    }

    /// Sets the base price of a zone pair, in either direction.
    pub async fn upsert_zone_price(
        &self,
        ctx: &RequestContext,
        input: ZonePriceInput,
    ) -> Result<ZonePrice, AppError> {
        self.rbac.require(ctx, SystemPermission::PricingManage)?;
        validate(&input)?;

        let price = self.reference.upsert_zone_price(&input).await?;
        self.pages.revalidate_paths(&[paths::ADMIN_ZONE_PRICES]).await;

        info!(
            admin_id = %ctx.user_id,
            zone_price_id = %price.id,
            origin_zone_id = %price.origin_zone_id,
            destination_zone_id = %price.destination_zone_id,
            base_price = %price.base_price,
            "Zone price saved"
        );
        Ok(price)
    }

    /// Removes a zone-pair price.
    pub async fn delete_zone_price(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        self.rbac.require(ctx, SystemPermission::PricingManage)?;

        if !self.reference.delete_zone_price(id).await? {
            return Err(AppError::not_found("Zone price not found"));
        }
        self.pages.revalidate_paths(&[paths::ADMIN_ZONE_PRICES]).await;

        info!(admin_id = %ctx.user_id, zone_price_id = %id, "Zone price deleted");
        Ok(())
    }

    /// Prices a transfer: the zone-pair base price times the vehicle type's
    /// multiplier.
    pub async fn quote(&self, request: &QuoteRequest) -> Result<Quote, AppError> {
        let origin_zone = self
            .zone_of("origin_location_id", request.origin_location_id)
            .await?;
        let destination_zone = self
            .zone_of("destination_location_id", request.destination_location_id)
            .await?;
        let vehicle_type = self
            .reference
            .find_vehicle_type(request.vehicle_type_id)
            .await?
            .ok_or_else(|| {
                AppError::invalid_field("vehicle_type_id", "Vehicle type does not exist")
            })?;

        let price = self
            .reference
            .find_zone_price(origin_zone, destination_zone)
            .await?
            .ok_or_else(|| AppError::not_found("No price is configured between these zones"))?;

        let quote = Quote::compute(
            origin_zone,
            destination_zone,
            vehicle_type.id,
            price.base_price,
            vehicle_type.price_multiplier,
        );
        debug!(
            origin_zone_id = %origin_zone,
            destination_zone_id = %destination_zone,
            total = %quote.total_price,
            "Quote computed"
        );
        Ok(quote)
    }

    /// Active pickup and drop-off locations for the public booking form.
    pub async fn public_locations(&self) -> Result<Vec<Location>, AppError> {
        self.reference.list_locations(true).await
    }

    /// Reference lists for admin and vendor forms.
    pub async fn form_options(&self, ctx: &RequestContext) -> Result<FormOptions, AppError> {
        ctx.owner_scope()?;
        Ok(FormOptions {
            locations: self.reference.list_locations(false).await?,
            zones: self.reference.list_zones().await?,
            vehicle_types: self.reference.list_vehicle_types().await?,
            vehicle_categories: self.reference.list_vehicle_categories().await?,
        })
    }

    async fn zone_of(&self, field: &str, location_id: Uuid) -> Result<Uuid, AppError> {
        let location = self
            .reference
            .find_location(location_id)
            .await?
            .ok_or_else(|| AppError::invalid_field(field, "Location does not exist"))?;
        location
            .zone_id
            .ok_or_else(|| AppError::invalid_field(field, "Location is not in a pricing zone"))
    }
}

#[cfg(test)]
mod tests {
    use fleetdesk_core::error::ErrorKind;
    use rust_decimal::Decimal;

    use super::*;
    use crate::testing::Fixture;

    struct Seeded {
        airport: Uuid,
        ubud: Uuid,
        van: Uuid,
        north: Uuid,
        south: Uuid,
    }

    fn seed(fx: &Fixture) -> Seeded {
        let south = fx.db.add_zone("South Bali");
        let north = fx.db.add_zone("Central Bali");
        let van = fx.db.add_vehicle_type(VehicleType {
            id: Uuid::new_v4(),
            name: "Van".into(),
            max_passengers: 10,
            price_multiplier: Decimal::new(15, 1),
        });
        Seeded {
            airport: fx.db.add_location("Ngurah Rai Airport", Some(south)),
            ubud: fx.db.add_location("Ubud", Some(north)),
            van,
            north,
            south,
        }
    }

    #[tokio::test]
    async fn test_quote_in_both_directions() {
        let fx = Fixture::new().await;
        let s = seed(&fx);
        let svc = &fx.services.pricing;
        svc.upsert_zone_price(
            &fx.admin,
            ZonePriceInput {
                origin_zone_id: s.north,
                destination_zone_id: s.south,
                base_price: Decimal::new(33_33, 2),
            },
        )
        .await
        .unwrap();

        let request = QuoteRequest {
            origin_location_id: s.airport,
            destination_location_id: s.ubud,
            vehicle_type_id: s.van,
        };
        let quote = svc.quote(&request).await.unwrap();
        assert_eq!(quote.total_price, Decimal::new(50_00, 2));

        let back = svc
            .quote(&QuoteRequest {
                origin_location_id: s.ubud,
                destination_location_id: s.airport,
                vehicle_type_id: s.van,
            })
            .await
            .unwrap();
        assert_eq!(back.total_price, quote.total_price);
    }

    #[tokio::test]
    async fn test_upsert_replaces_pair_price() {
        let fx = Fixture::new().await;
        let s = seed(&fx);
        let svc = &fx.services.pricing;
        for (a, b, cents) in [(s.south, s.north, 30_00), (s.north, s.south, 35_00)] {
            svc.upsert_zone_price(
                &fx.admin,
                ZonePriceInput {
                    origin_zone_id: a,
                    destination_zone_id: b,
                    base_price: Decimal::new(cents, 2),
                },
            )
            .await
            .unwrap();
        }

        let page = svc
            .list_zone_prices(&fx.admin, &ZonePriceFilter::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].base_price, Decimal::new(35_00, 2));
    }

    #[tokio::test]
    async fn test_missing_price_and_zone() {
        let fx = Fixture::new().await;
        let s = seed(&fx);
        let svc = &fx.services.pricing;

        let err = svc
            .quote(&QuoteRequest {
                origin_location_id: s.airport,
                destination_location_id: s.ubud,
                vehicle_type_id: s.van,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let floating = fx.db.add_location("Gili Trawangan", None);
        let err = svc
            .quote(&QuoteRequest {
                origin_location_id: floating,
                destination_location_id: s.ubud,
                vehicle_type_id: s.van,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_vendor_cannot_set_prices() {
        let fx = Fixture::new().await;
        let s = seed(&fx);
        let vendor = fx.vendor("Bali Rides");
        let err = fx
            .services
            .pricing
            .upsert_zone_price(
                &vendor,
                ZonePriceInput {
                    origin_zone_id: s.south,
                    destination_zone_id: s.north,
                    base_price: Decimal::ONE,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let options = fx.services.pricing.form_options(&vendor).await.unwrap();
        assert_eq!(options.zones.len(), 2);
    }
}
