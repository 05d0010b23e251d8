//! Typed review list filter.

use chrono::{DateTime, Utc};
use fleetdesk_core::types::{FilterField, ListFilter, ListQuery, PageRequest, SortField};

use super::model::ReviewStatus;

/// Sort keys accepted for review lists.
pub const REVIEW_SORT_KEYS: &[&str] = &["created_at", "rating"];

/// Parsed review list filter.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    /// Matches review text, title, or customer name.
    pub search: Option<String>,
    /// Moderation status.
    pub status: Option<ReviewStatus>,
    /// Exact star rating.
    pub rating: Option<i32>,
    /// Featured flag.
    pub is_featured: Option<bool>,
    /// Inclusive lower bound on submission time.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on submission time.
    pub date_to: Option<DateTime<Utc>>,
    /// Ordering.
    pub sort: SortField,
    /// Requested page.
    pub page: PageRequest,
}

impl ReviewFilter {
    /// The public site's view: approved and featured reviews.
    pub fn featured(mut self) -> Self {
        self.status = Some(ReviewStatus::Approved);
        self.is_featured = Some(true);
        self
    }
}

impl ListFilter for ReviewFilter {
    fn to_list_query(&self) -> ListQuery {
        ListQuery::new(self.page)
            .search(
                self.search.as_deref(),
                &["review_text", "title", "customer_name"],
            )
            .filter_opt(self.status, |s| FilterField::eq("status", s.as_str()))
            .filter_opt(self.rating, |r| FilterField::eq("rating", r))
            .filter_opt(self.is_featured, |v| FilterField::eq("is_featured", v))
            .filter_opt(self.date_from, |d| FilterField::gte("created_at", d))
            .filter_opt(self.date_to, |d| FilterField::lte("created_at", d))
            .sort(self.sort.clone())
    }
}
