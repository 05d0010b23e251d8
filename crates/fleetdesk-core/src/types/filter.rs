//! Filter types for dynamic query building.
//!
//! Field names are logical names; each backend maps them onto its own
//! columns and rejects names it does not know.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// SQL `ILIKE` case-insensitive pattern match.
    ILike,
    /// Membership in a list value.
    In,
}

impl FilterOp {
    /// Return the SQL operator for this comparison.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => " = ",
            Self::Ne => " <> ",
            Self::Gt => " > ",
            Self::Gte => " >= ",
            Self::Lt => " < ",
            Self::Lte => " <= ",
            Self::ILike => " ILIKE ",
            Self::In => " = ANY(",
        }
    }
}

/// A dynamic filter value that can represent the column types in use.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null / no value.
    Null,
    /// A boolean value.
    Boolean(bool),
    /// An integer value.
    Integer(i64),
    /// A floating-point value (decimal columns are compared as floats in memory).
    Float(f64),
    /// A UUID value.
    Uuid(Uuid),
    /// A UTC timestamp.
    Timestamp(DateTime<Utc>),
    /// A string value.
    String(String),
    /// A list of UUIDs (for `In`).
    UuidList(Vec<Uuid>),
    /// A list of strings (for `In`).
    StringList(Vec<String>),
}

impl FilterValue {
    /// Compare two scalar values of the same type. Null sorts first.
    pub fn compare(&self, other: &FilterValue) -> Option<Ordering> {
        use FilterValue::*;
        match (self, other) {
            (Null, Null) => Some(Ordering::Equal),
            (Null, _) => Some(Ordering::Less),
            (_, Null) => Some(Ordering::Greater),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            (String(a), String(b)) => Some(a.to_lowercase().cmp(&b.to_lowercase())),
            _ => None,
        }
    }

    /// Textual form used for substring search.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Uuid(u) => Some(u.to_string()),
            Self::Integer(i) => Some(i.to_string()),
            _ => None,
        }
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// A single filter condition on a named field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterField {
    /// The logical field name to filter on.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl FilterField {
    /// Create a new filter field.
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Shorthand for an inclusive lower bound.
    pub fn gte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Gte, value)
    }

    /// Shorthand for an inclusive upper bound.
    pub fn lte(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Lte, value)
    }

    /// Shorthand for a case-insensitive substring match.
    pub fn contains(field: impl Into<String>, term: &str) -> Self {
        Self::new(field, FilterOp::ILike, FilterValue::String(like_pattern(term)))
    }

    /// Evaluate the condition against a row's value for `field`.
    pub fn matches(&self, actual: &FilterValue) -> bool {
        match self.op {
            FilterOp::Eq => actual.compare(&self.value) == Some(Ordering::Equal),
            FilterOp::Ne => actual.compare(&self.value) != Some(Ordering::Equal),
            FilterOp::Gt => actual.compare(&self.value) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(
                actual.compare(&self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => actual.compare(&self.value) == Some(Ordering::Less),
            FilterOp::Lte => matches!(
                actual.compare(&self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::ILike => match (&self.value, actual.as_text()) {
                (FilterValue::String(pattern), Some(text)) => ilike(&text, pattern),
                _ => false,
            },
            FilterOp::In => match (&self.value, actual) {
                (FilterValue::UuidList(list), FilterValue::Uuid(id)) => list.contains(id),
                (FilterValue::StringList(list), FilterValue::String(s)) => list.contains(s),
                _ => false,
            },
        }
    }
}

/// Build a `%term%` pattern, escaping the LIKE metacharacters in `term`.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// In-process equivalent of `text ILIKE pattern` for `%term%` patterns
/// built by [`like_pattern`].
fn ilike(text: &str, pattern: &str) -> bool {
    let inner = pattern.strip_prefix('%').unwrap_or(pattern);
    let inner = inner.strip_suffix('%').unwrap_or(inner);

    let mut needle = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => needle.extend(chars.next()),
            _ => needle.push(c),
        }
    }

    text.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let filter = FilterField::contains("title", "Tips");
        assert!(filter.matches(&FilterValue::from("Travel tips for Bali")));
        assert!(!filter.matches(&FilterValue::from("Airport guide")));
        assert!(!filter.matches(&FilterValue::Null));
    }

    #[test]
    fn test_contains_treats_wildcards_literally() {
        let filter = FilterField::contains("code", "5%");
        assert!(filter.matches(&FilterValue::from("save 5% now")));
        assert!(!filter.matches(&FilterValue::from("save 50 now")));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let day = "2025-03-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(FilterField::gte("created_at", day).matches(&FilterValue::from(day)));
        assert!(FilterField::lte("created_at", day).matches(&FilterValue::from(day)));
        assert!(!FilterField::gte("rating", 4).matches(&FilterValue::from(3)));
    }

    #[test]
    fn test_in_list() {
        let a = Uuid::new_v4();
        let filter = FilterField::new("id", FilterOp::In, FilterValue::UuidList(vec![a]));
        assert!(filter.matches(&FilterValue::from(a)));
        assert!(!filter.matches(&FilterValue::from(Uuid::new_v4())));
    }

    #[test]
    fn test_null_sorts_first() {
        assert_eq!(
            FilterValue::Null.compare(&FilterValue::from(1)),
            Some(Ordering::Less)
        );
    }
}
