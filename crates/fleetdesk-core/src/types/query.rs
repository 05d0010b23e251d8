//! Backend-neutral description of a filtered, sorted, paginated list.

use serde::Serialize;

use super::filter::FilterField;
use super::pagination::PageRequest;
use super::sorting::SortField;

/// Free-text search OR-ed across a set of fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Search {
    /// The raw search term, trimmed.
    pub term: String,
    /// Logical field names the term is matched against.
    pub fields: Vec<&'static str>,
}

/// A list request after the filter state has been parsed.
///
/// Every condition in `filters` is AND-ed; `search`, when present, adds one
/// more condition that is true when any of its fields contains the term.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListQuery {
    /// Optional free-text search.
    pub search: Option<Search>,
    /// Equality / range / membership predicates.
    pub filters: Vec<FilterField>,
    /// Ordering. The row id is always appended as a tie-breaker.
    pub sort: SortField,
    /// Requested page.
    pub page: PageRequest,
}

impl ListQuery {
    /// An unfiltered query for the given page, newest first.
    pub fn new(page: PageRequest) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Add a free-text search when `term` is present and non-blank.
    pub fn search(mut self, term: Option<&str>, fields: &[&'static str]) -> Self {
        if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
            self.search = Some(Search {
                term: term.to_string(),
                fields: fields.to_vec(),
            });
        }
        self
    }

    /// Add a predicate.
    pub fn filter(mut self, filter: FilterField) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add a predicate only when `value` is present.
    pub fn filter_opt<T>(mut self, value: Option<T>, build: impl FnOnce(T) -> FilterField) -> Self {
        if let Some(value) = value {
            self.filters.push(build(value));
        }
        self
    }

    /// Set the ordering.
    pub fn sort(mut self, sort: SortField) -> Self {
        self.sort = sort;
        self
    }
}

/// A typed filter object that can be rendered into a [`ListQuery`].
pub trait ListFilter {
    /// Translate the typed filter into the backend-neutral query.
    fn to_list_query(&self) -> ListQuery;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::filter::FilterOp;

    #[test]
    fn test_default_query_is_unfiltered_first_page() {
        let query = ListQuery::default();
        assert!(query.search.is_none());
        assert!(query.filters.is_empty());
        assert_eq!(query.page, PageRequest::default());
        assert_eq!(query.sort, SortField::newest_first());
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let query = ListQuery::default().search(Some("   "), &["title"]);
        assert!(query.search.is_none());

        let query = ListQuery::default().search(Some(" bali "), &["title", "excerpt"]);
        assert_eq!(query.search.unwrap().term, "bali");
    }

    #[test]
    fn test_filter_opt_skips_absent_values() {
        let query = ListQuery::default()
            .filter_opt(None::<bool>, |v| FilterField::eq("is_featured", v))
            .filter_opt(Some(true), |v| FilterField::eq("is_active", v));
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].field, "is_active");
        assert_eq!(query.filters[0].op, FilterOp::Eq);
    }
}
