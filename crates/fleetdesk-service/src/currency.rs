//! Currencies and the default-currency rule.
//!
//! Exactly one currency is the default once any has been chosen. The default
//! is always active and cannot be deleted or deactivated; choose another
//! default first.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use fleetdesk_auth::{RbacEnforcer, RequestContext, SystemPermission};
use fleetdesk_cache::Revalidator;
use fleetdesk_core::error::AppError;
use fleetdesk_core::types::pagination::MAX_LIMIT;
use fleetdesk_core::types::{
    FilterField, ListFilter, ListQuery, OwnerScope, PageRequest, PageResponse, SortField,
};
use fleetdesk_database::repositories::CurrencyRepository;
use fleetdesk_entity::currency::{Currency, CurrencyFilter, CurrencyInput};

use crate::paths;
use crate::support::{found, validate};

/// Manages currencies.
#[derive(Clone)]
pub struct CurrencyService {
    repo: Arc<dyn CurrencyRepository>,
    pages: Revalidator,
    rbac: Arc<RbacEnforcer>,
}

impl CurrencyService {
    /// Creates a new currency service.
    pub fn new(
        repo: Arc<dyn CurrencyRepository>,
        pages: Revalidator,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self { repo, pages, rbac }
    }

    /// Lists currencies.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &CurrencyFilter,
    ) -> Result<PageResponse<Currency>, AppError> {
        self.rbac.require(ctx, SystemPermission::CurrencyManage)?;
        let query = filter.to_list_query();
        self.pages
            .cached(paths::ADMIN_CURRENCIES, &query, &[], || {
                self.repo.list(&query, OwnerScope::All)
            })
            .await
    }

    /// Gets one currency.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Currency, AppError> {
        self.rbac.require(ctx, SystemPermission::CurrencyManage)?;
        self.find(id).await
    }

    /// Active currencies by code, for the public currency picker.
    pub async fn public_list(&self) -> Result<Vec<Currency>, AppError> {
        let query = ListQuery::new(PageRequest::new(1, MAX_LIMIT))
            .filter(FilterField::eq("is_active", true))
            .sort(SortField::asc("code"));
        let page = self
            .pages
            .cached(paths::PUBLIC_CURRENCIES, &query, &[], || {
                self.repo.list(&query, OwnerScope::All)
            })
            .await?;
        Ok(page.items)
    }

    /// Creates a currency.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        mut input: CurrencyInput,
    ) -> Result<Currency, AppError> {
        self.rbac.require(ctx, SystemPermission::CurrencyManage)?;
        input.normalize();
        validate(&input)?;

        let currency = self.repo.create(&input).await?;
        self.revalidate(currency.id).await;

        info!(
            admin_id = %ctx.user_id,
            currency_id = %currency.id,
            code = %currency.code,
            "Currency created"
        );
        Ok(currency)
    }

    /// Replaces a currency's fields.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        mut input: CurrencyInput,
    ) -> Result<Currency, AppError> {
        self.rbac.require(ctx, SystemPermission::CurrencyManage)?;
        input.normalize();
        validate(&input)?;
        let current = self.find(id).await?;
        if current.is_default && !input.is_active {
            return Err(AppError::invalid_field(
                "is_active",
                "The default currency must stay active",
            ));
        }

        let currency = found(self.repo.update(id, &input).await?, "Currency")?;
        self.revalidate(id).await;

        info!(
            admin_id = %ctx.user_id,
            currency_id = %id,
            code = %currency.code,
            "Currency updated"
        );
        Ok(currency)
    }

    /// Flips `is_active`. The default currency cannot be deactivated.
    pub async fn toggle_active(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Currency, AppError> {
        self.rbac.require(ctx, SystemPermission::CurrencyManage)?;
        if self.find(id).await?.is_default {
            return Err(AppError::integrity("Cannot deactivate the default currency."));
        }

        let currency = found(self.repo.toggle_active(id).await?, "Currency")?;
        self.revalidate(id).await;

        info!(
            admin_id = %ctx.user_id,
            currency_id = %id,
            is_active = currency.is_active,
            "Currency toggled"
        );
        Ok(currency)
    }

    /// Makes `id` the only default currency.
    pub async fn set_default(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Currency, AppError> {
        self.rbac.require(ctx, SystemPermission::CurrencyManage)?;

        let currency = found(self.repo.set_default(id).await?, "Currency")?;
        self.revalidate(id).await;

        info!(
            admin_id = %ctx.user_id,
            currency_id = %id,
            code = %currency.code,
            "Default currency changed"
        );
        Ok(currency)
    }

    /// Deletes a currency other than the default.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        self.rbac.require(ctx, SystemPermission::CurrencyManage)?;
        if self.find(id).await?.is_default {
            return Err(AppError::integrity("Cannot delete the default currency."));
        }

        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("Currency not found"));
        }
        self.revalidate(id).await;

        info!(admin_id = %ctx.user_id, currency_id = %id, "Currency deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Currency, AppError> {
        found(self.repo.find_by_id(id, OwnerScope::All).await?, "Currency")
    }

    async fn revalidate(&self, id: Uuid) {
        let detail = paths::detail(paths::ADMIN_CURRENCIES, id);
        self.pages
            .revalidate_paths(&[paths::ADMIN_CURRENCIES, &detail, paths::PUBLIC_CURRENCIES])
            .await;
    }
}

#[cfg(test)]
mod tests {
    use fleetdesk_core::error::ErrorKind;
    use rust_decimal::Decimal;

    use super::*;
    use crate::testing::Fixture;

    fn input(code: &str) -> CurrencyInput {
        CurrencyInput {
            code: code.into(),
            name: format!("{code} name"),
            symbol: "$".into(),
            exchange_rate: Decimal::ONE,
            decimal_places: 2,
            is_active: false,
        }
    }

    #[tokio::test]
    async fn test_default_cannot_be_deleted() {
        let fx = Fixture::new().await;
        let svc = &fx.services.currencies;
        let usd = svc.create(&fx.admin, input(" usd ")).await.unwrap();
        assert_eq!(usd.code, "USD");

        let usd = svc.set_default(&fx.admin, usd.id).await.unwrap();
        assert!(usd.is_default && usd.is_active);

        let err = svc.delete(&fx.admin, usd.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Integrity);
        assert_eq!(err.message, "Cannot delete the default currency.");

        let err = svc.toggle_active(&fx.admin, usd.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Integrity);
        assert!(svc.get(&fx.admin, usd.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_switching_default_leaves_one() {
        let fx = Fixture::new().await;
        let svc = &fx.services.currencies;
        let usd = svc.create(&fx.admin, input("USD")).await.unwrap();
        let idr = svc.create(&fx.admin, input("IDR")).await.unwrap();
        svc.set_default(&fx.admin, usd.id).await.unwrap();
        svc.set_default(&fx.admin, idr.id).await.unwrap();

        assert!(!svc.get(&fx.admin, usd.id).await.unwrap().is_default);
        svc.delete(&fx.admin, usd.id).await.unwrap();

        let public = svc.public_list().await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].code, "IDR");
    }

    #[tokio::test]
    async fn test_invalid_code() {
        let fx = Fixture::new().await;
        let err = fx
            .services
            .currencies
            .create(&fx.admin, input("DOLLAR"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
