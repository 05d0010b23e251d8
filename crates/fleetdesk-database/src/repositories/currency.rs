//! Currency repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use fleetdesk_core::error::{AppError, ErrorKind};
use fleetdesk_core::result::AppResult;
use fleetdesk_core::traits::ListRepository;
use fleetdesk_core::types::{FilterValue, ListQuery, OwnerScope, PageResponse};
use fleetdesk_entity::currency::{Currency, CurrencyInput};

use super::booking::decimal;
use crate::memory::table::paginate;
use crate::memory::{MemoryDatabase, Record};
use crate::query::{self, Table, messages};

/// Currency reads and writes.
#[async_trait]
pub trait CurrencyRepository: ListRepository<Currency> {
    /// Insert a currency (never the default).
    async fn create(&self, input: &CurrencyInput) -> AppResult<Currency>;

    /// Replace a currency's columns.
    async fn update(&self, id: Uuid, input: &CurrencyInput) -> AppResult<Option<Currency>>;

    /// Flip `is_active`.
    async fn toggle_active(&self, id: Uuid) -> AppResult<Option<Currency>>;

    /// Make `id` the only default currency, activating it.
    async fn set_default(&self, id: Uuid) -> AppResult<Option<Currency>>;

    /// Delete one currency.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub(crate) const CURRENCIES: Table = Table {
    name: "currencies",
    alias: "cur",
    columns: "cur.*",
    from: "FROM currencies cur",
    fields: &[
        ("id", "cur.id"),
        ("code", "cur.code"),
        ("name", "cur.name"),
        ("is_active", "cur.is_active"),
        ("is_default", "cur.is_default"),
        ("exchange_rate", "cur.exchange_rate"),
        ("created_at", "cur.created_at"),
    ],
    owner: None,
};

/// PostgreSQL implementation.
#[derive(Debug, Clone)]
pub struct PgCurrencyRepository {
    pool: PgPool,
}

impl PgCurrencyRepository {
    /// Create a new currency repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListRepository<Currency> for PgCurrencyRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<Currency>> {
        query::fetch_page(&self.pool, &CURRENCIES, query, scope).await
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Currency>> {
        query::fetch_by_id(&self.pool, &CURRENCIES, id, scope).await
    }
}

#[async_trait]
impl CurrencyRepository for PgCurrencyRepository {
    async fn create(&self, input: &CurrencyInput) -> AppResult<Currency> {
        sqlx::query_as::<_, Currency>(
            "INSERT INTO currencies (id, code, name, symbol, exchange_rate, decimal_places, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.symbol)
        .bind(input.exchange_rate)
        .bind(input.decimal_places)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| query::write_error(&CURRENCIES, e))
    }

    async fn update(&self, id: Uuid, input: &CurrencyInput) -> AppResult<Option<Currency>> {
        sqlx::query_as::<_, Currency>(
            "UPDATE currencies SET code = $2, name = $3, symbol = $4, exchange_rate = $5, \
             decimal_places = $6, is_active = $7, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.symbol)
        .bind(input.exchange_rate)
        .bind(input.decimal_places)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query::write_error(&CURRENCIES, e))
    }

    async fn toggle_active(&self, id: Uuid) -> AppResult<Option<Currency>> {
        if !query::toggle(&self.pool, &CURRENCIES, id, "is_active", OwnerScope::All).await? {
            return Ok(None);
        }
        query::fetch_by_id(&self.pool, &CURRENCIES, id, OwnerScope::All).await
    }

    async fn set_default(&self, id: Uuid) -> AppResult<Option<Currency>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "UPDATE currencies SET is_default = FALSE, updated_at = NOW() \
             WHERE is_default AND id <> $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| query::write_error(&CURRENCIES, e))?;

        let currency = sqlx::query_as::<_, Currency>(
            "UPDATE currencies SET is_default = TRUE, is_active = TRUE, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| query::write_error(&CURRENCIES, e))?;

        // Dropping the transaction rolls back the reset when `id` is unknown.
        if currency.is_some() {
            tx.commit().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to commit default currency", e)
            })?;
        }
        Ok(currency)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        query::delete_one(&self.pool, &CURRENCIES, id, OwnerScope::All).await
    }
}

impl Record for Currency {
    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> Option<FilterValue> {
        Some(match name {
            "id" => self.id.into(),
            "code" => self.code.as_str().into(),
            "name" => self.name.as_str().into(),
            "is_active" => self.is_active.into(),
            "is_default" => self.is_default.into(),
            "exchange_rate" => decimal(self.exchange_rate),
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
pub struct MemoryCurrencyRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryCurrencyRepository {
    /// Create a repository over the shared in-memory tables.
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }

    fn ensure_unique_code(&self, code: &str, except: Option<Uuid>) -> AppResult<()> {
        if self
            .db
            .currencies
            .any(|c| c.code == code && Some(c.id) != except)
        {
            return Err(AppError::conflict(messages::DUPLICATE_CURRENCY));
        }
        Ok(())
    }
}

#[async_trait]
impl ListRepository<Currency> for MemoryCurrencyRepository {
    async fn list(&self, query: &ListQuery, scope: OwnerScope) -> AppResult<PageResponse<Currency>> {
        paginate(self.db.currencies.visible(scope), query)
    }

    async fn find_by_id(&self, id: Uuid, scope: OwnerScope) -> AppResult<Option<Currency>> {
        Ok(self.db.currencies.get(id, scope))
    }
}

#[async_trait]
impl CurrencyRepository for MemoryCurrencyRepository {
    async fn create(&self, input: &CurrencyInput) -> AppResult<Currency> {
        self.ensure_unique_code(&input.code, None)?;
        let now = Utc::now();
        Ok(self.db.currencies.insert(Currency {
            id: Uuid::new_v4(),
            code: input.code.clone(),
            name: input.name.clone(),
            symbol: input.symbol.clone(),
            exchange_rate: input.exchange_rate,
            decimal_places: input.decimal_places,
            is_active: input.is_active,
            is_default: false,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update(&self, id: Uuid, input: &CurrencyInput) -> AppResult<Option<Currency>> {
        self.ensure_unique_code(&input.code, Some(id))?;
        Ok(self.db.currencies.update(id, OwnerScope::All, |c| {
            c.code = input.code.clone();
            c.name = input.name.clone();
            c.symbol = input.symbol.clone();
            c.exchange_rate = input.exchange_rate;
            c.decimal_places = input.decimal_places;
            c.is_active = input.is_active;
        }))
    }

    async fn toggle_active(&self, id: Uuid) -> AppResult<Option<Currency>> {
        Ok(self
            .db
            .currencies
            .update(id, OwnerScope::All, |c| c.is_active = !c.is_active))
    }

    async fn set_default(&self, id: Uuid) -> AppResult<Option<Currency>> {
        if self.db.currencies.get(id, OwnerScope::All).is_none() {
            return Ok(None);
        }
        self.db.currencies.update_all(|c| {
            let was = c.is_default;
            c.is_default = c.id == id;
            if c.is_default {
                c.is_active = true;
            }
            was != c.is_default
        });
        Ok(self.db.currencies.get(id, OwnerScope::All))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.db.currencies.remove_many(&[id], OwnerScope::All) > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn input(code: &str) -> CurrencyInput {
        CurrencyInput {
            code: code.into(),
            name: format!("{code} currency"),
            symbol: "$".into(),
            exchange_rate: Decimal::ONE,
            decimal_places: 2,
            is_active: false,
        }
    }

    #[tokio::test]
    async fn test_exactly_one_default() {
        let repo = MemoryCurrencyRepository::new(Arc::new(MemoryDatabase::new()));
        let usd = repo.create(&input("USD")).await.unwrap();
        let idr = repo.create(&input("IDR")).await.unwrap();

        repo.set_default(usd.id).await.unwrap().unwrap();
        let idr_default = repo.set_default(idr.id).await.unwrap().unwrap();
        assert!(idr_default.is_default);
        assert!(idr_default.is_active);

        let page = repo
            .list(&ListQuery::default(), OwnerScope::All)
            .await
            .unwrap();
        assert_eq!(page.items.iter().filter(|c| c.is_default).count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_default_changes_nothing() {
        let repo = MemoryCurrencyRepository::new(Arc::new(MemoryDatabase::new()));
        let usd = repo.create(&input("USD")).await.unwrap();
        repo.set_default(usd.id).await.unwrap();
        assert!(repo.set_default(Uuid::new_v4()).await.unwrap().is_none());
        assert!(repo.find_by_id(usd.id, OwnerScope::All).await.unwrap().unwrap().is_default);
    }

    #[tokio::test]
    async fn test_duplicate_code() {
        let repo = MemoryCurrencyRepository::new(Arc::new(MemoryDatabase::new()));
        repo.create(&input("EUR")).await.unwrap();
        let err = repo.create(&input("EUR")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
