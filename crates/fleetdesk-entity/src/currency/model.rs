//! Currency entity model and list filter.

use chrono::{DateTime, Utc};
use fleetdesk_core::types::{FilterField, ListFilter, ListQuery, PageRequest, SortField};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::validation::positive_decimal;

/// Sort keys accepted for currency lists.
pub const CURRENCY_SORT_KEYS: &[&str] = &["code", "name", "created_at", "exchange_rate"];

/// A display / settlement currency.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Currency {
    /// Unique currency identifier.
    pub id: Uuid,
    /// ISO 4217 code, upper-case.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Display symbol.
    pub symbol: String,
    /// Units of this currency per one unit of the default currency.
    pub exchange_rate: Decimal,
    /// Minor-unit digits shown.
    pub decimal_places: i32,
    /// Offered to customers.
    pub is_active: bool,
    /// The base currency; exactly one row has this set.
    pub is_default: bool,
    /// When the currency was created.
    pub created_at: DateTime<Utc>,
    /// When the currency was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Create/edit form for a currency.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CurrencyInput {
    /// ISO 4217 code.
    #[validate(custom(function = "currency_code"))]
    pub code: String,
    /// Display name.
    #[validate(length(min = 2, max = 100, message = "Name must be 2 to 100 characters"))]
    pub name: String,
    /// Display symbol.
    #[validate(length(min = 1, max = 8, message = "Symbol must be 1 to 8 characters"))]
    pub symbol: String,
    /// Exchange rate against the default currency.
    #[validate(custom(function = "positive_decimal"))]
    pub exchange_rate: Decimal,
    /// Minor-unit digits.
    #[serde(default = "default_decimal_places")]
    #[validate(range(min = 0, max = 4))]
    pub decimal_places: i32,
    /// Offered to customers.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CurrencyInput {
    /// Trim fields and upper-case the code.
    pub fn normalize(&mut self) {
        self.code = self.code.trim().to_ascii_uppercase();
        self.name = self.name.trim().to_string();
        self.symbol = self.symbol.trim().to_string();
    }
}

/// Parsed currency list filter.
#[derive(Debug, Clone)]
pub struct CurrencyFilter {
    /// Matches code or name.
    pub search: Option<String>,
    /// Offered flag.
    pub is_active: Option<bool>,
    /// Ordering.
    pub sort: SortField,
    /// Requested page.
    pub page: PageRequest,
}

impl Default for CurrencyFilter {
    fn default() -> Self {
        Self {
            search: None,
            is_active: None,
            sort: SortField::asc("code"),
            page: PageRequest::default(),
        }
    }
}

impl ListFilter for CurrencyFilter {
    fn to_list_query(&self) -> ListQuery {
        ListQuery::new(self.page)
            .search(self.search.as_deref(), &["code", "name"])
            .filter_opt(self.is_active, |v| FilterField::eq("is_active", v))
            .sort(self.sort.clone())
    }
}

fn currency_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        let mut err = ValidationError::new("currency_code");
        err.message = Some("Code must be three letters (ISO 4217)".into());
        return Err(err);
    }
    Ok(())
}

fn default_decimal_places() -> i32 {
    2
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_then_validate() {
        let mut input = CurrencyInput {
            code: " idr ".into(),
            name: "Indonesian Rupiah".into(),
            symbol: "Rp".into(),
            exchange_rate: Decimal::new(16250, 0),
            decimal_places: 0,
            is_active: true,
        };
        assert!(input.validate().is_err());
        input.normalize();
        assert_eq!(input.code, "IDR");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_rate_must_be_positive() {
        let input = CurrencyInput {
            code: "USD".into(),
            name: "US Dollar".into(),
            symbol: "$".into(),
            exchange_rate: Decimal::ZERO,
            decimal_places: 2,
            is_active: true,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("exchange_rate"));
    }
}
