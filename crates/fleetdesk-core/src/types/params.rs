//! Parsing of raw query-string values into typed filter fields.
//!
//! Query parameters arrive as optional strings. For select-style filters a
//! value that is absent, blank, or the sentinel `"all"` means "no filter".
//! Free-text search is only dropped when blank. Anything else must parse,
//! otherwise the request is rejected with a field-level validation error.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;

use super::pagination::{DEFAULT_LIMIT, PageRequest};
use super::sorting::{SortDirection, SortField};

/// The value that disables a select-style filter.
pub const ALL_SENTINEL: &str = "all";

/// Query parameters shared by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Free-text search.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
    /// Sort key.
    pub sort: Option<String>,
    /// Sort direction (`asc` / `desc`).
    pub order: Option<String>,
}

impl ListParams {
    /// The trimmed search term, if any. `"all"` is searched like any other word.
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Parse `page` and `limit` into a clamped page request.
    pub fn page_request(&self) -> AppResult<PageRequest> {
        let page = parse_number("page", self.page.as_deref())?.unwrap_or(1);
        let limit = parse_number("limit", self.limit.as_deref())?.unwrap_or(DEFAULT_LIMIT);
        Ok(PageRequest::new(page, limit))
    }

    /// Parse `sort` and `order` against the keys a resource allows.
    pub fn sort_field(&self, allowed: &[&str], default: SortField) -> AppResult<SortField> {
        let direction = match present(self.order.as_deref()) {
            Some(order) => Some(order.parse::<SortDirection>()?),
            None => None,
        };

        match present(self.sort.as_deref()) {
            Some(key) if allowed.contains(&key) => {
                Ok(SortField::new(key, direction.unwrap_or(SortDirection::Desc)))
            }
            Some(key) => Err(AppError::invalid_field(
                "sort",
                format!("Unknown sort key: '{key}'. Expected one of: {}", allowed.join(", ")),
            )),
            None => Ok(match direction {
                Some(direction) => SortField::new(default.field, direction),
                None => default,
            }),
        }
    }
}

/// Trim a raw value and drop it when blank or equal to `"all"`.
pub fn present(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL_SENTINEL))
}

/// Parse an optional enum-like value through its `FromStr` impl.
pub fn parse_enum<T>(field: &str, value: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    present(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| AppError::invalid_field(field, e.message))
        })
        .transpose()
}

/// Parse an optional UUID.
pub fn parse_uuid(field: &str, value: Option<&str>) -> AppResult<Option<Uuid>> {
    present(value)
        .map(|v| {
            Uuid::parse_str(v)
                .map_err(|_| AppError::invalid_field(field, format!("'{v}' is not a valid id")))
        })
        .transpose()
}

/// Parse an optional boolean (`true`/`false`/`1`/`0`/`yes`/`no`).
pub fn parse_bool(field: &str, value: Option<&str>) -> AppResult<Option<bool>> {
    present(value)
        .map(|v| match v.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(AppError::invalid_field(
                field,
                format!("'{v}' is not a valid boolean"),
            )),
        })
        .transpose()
}

/// Parse an optional positive integer.
pub fn parse_number<T>(field: &str, value: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr + PartialOrd + Default,
{
    present(value)
        .map(|v| match v.parse::<T>() {
            Ok(n) if n > T::default() => Ok(n),
            _ => Err(AppError::invalid_field(
                field,
                format!("'{v}' is not a positive integer"),
            )),
        })
        .transpose()
}

/// Parse the inclusive lower bound of a date range.
///
/// A bare date (`2025-03-01`) means the start of that day (UTC).
pub fn parse_date_start(field: &str, value: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    parse_date_bound(field, value, NaiveTime::MIN)
}

/// Parse the inclusive upper bound of a date range.
///
/// A bare date (`2025-03-31`) means the last instant of that day (UTC).
pub fn parse_date_end(field: &str, value: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    let end_of_day =
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN);
    parse_date_bound(field, value, end_of_day)
}

fn parse_date_bound(
    field: &str,
    value: Option<&str>,
    time_of_day: NaiveTime,
) -> AppResult<Option<DateTime<Utc>>> {
    let Some(v) = present(value) else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(v) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    NaiveDate::parse_from_str(v, "%Y-%m-%d")
        .map(|date| Some(Utc.from_utc_datetime(&date.and_time(time_of_day))))
        .map_err(|_| {
            AppError::invalid_field(
                field,
                format!("'{v}' is not a valid date (expected YYYY-MM-DD)"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sentinel_and_blank_are_absent() {
        assert_eq!(present(Some("all")), None);
        assert_eq!(present(Some("ALL")), None);
        assert_eq!(present(Some("  ")), None);
        assert_eq!(present(None), None);
        assert_eq!(present(Some(" pending ")), Some("pending"));
    }

    #[test]
    fn test_search_keeps_the_word_all() {
        let params = ListParams {
            search: Some(" All ".into()),
            ..Default::default()
        };
        assert_eq!(params.search(), Some("All"));

        let blank = ListParams {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(blank.search(), None);
    }

    #[test]
    fn test_empty_params_give_first_page() {
        let params = ListParams::default();
        assert_eq!(params.page_request().unwrap(), PageRequest::default());
        assert_eq!(
            params.sort_field(&["created_at"], SortField::newest_first()).unwrap(),
            SortField::newest_first()
        );
    }

    #[test]
    fn test_page_and_limit_parsing() {
        let params = ListParams {
            page: Some("3".into()),
            limit: Some("10".into()),
            ..Default::default()
        };
        assert_eq!(params.page_request().unwrap(), PageRequest::new(3, 10));

        let bad = ListParams {
            page: Some("zero".into()),
            ..Default::default()
        };
        let err = bad.page_request().unwrap_err();
        assert!(err.details.unwrap().get("page").is_some());
    }

    #[test]
    fn test_unknown_sort_key_is_rejected() {
        let params = ListParams {
            sort: Some("password".into()),
            ..Default::default()
        };
        assert!(params
            .sort_field(&["created_at", "title"], SortField::newest_first())
            .is_err());
    }

    #[test]
    fn test_explicit_sort() {
        let params = ListParams {
            sort: Some("title".into()),
            order: Some("asc".into()),
            ..Default::default()
        };
        let sort = params
            .sort_field(&["created_at", "title"], SortField::newest_first())
            .unwrap();
        assert_eq!(sort, SortField::asc("title"));
    }

    #[test]
    fn test_date_bounds_cover_whole_days() {
        let start = parse_date_start("date_from", Some("2025-03-01")).unwrap().unwrap();
        let end = parse_date_end("date_to", Some("2025-03-01")).unwrap().unwrap();
        assert_eq!(start.to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert!(end > start);
        assert_eq!(end.format("%H:%M:%S").to_string(), "23:59:59");

        assert!(parse_date_start("date_from", Some("03/01/2025")).is_err());
        assert_eq!(parse_date_end("date_to", Some("all")).unwrap(), None);
    }

    #[test]
    fn test_uuid_and_bool() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid("category_id", Some(&id.to_string())).unwrap(), Some(id));
        assert!(parse_uuid("category_id", Some("nope")).is_err());
        assert_eq!(parse_bool("is_featured", Some("true")).unwrap(), Some(true));
        assert_eq!(parse_bool("is_featured", Some("all")).unwrap(), None);
    }
}
