//! Typed blog list filters.

use chrono::{DateTime, Utc};
use fleetdesk_core::types::{FilterField, ListFilter, ListQuery, PageRequest, SortField};
use uuid::Uuid;

use super::status::PostStatus;

/// Sort keys accepted for post lists.
pub const POST_SORT_KEYS: &[&str] = &["created_at", "published_at", "title", "reading_time"];
/// Sort keys accepted for category lists.
pub const CATEGORY_SORT_KEYS: &[&str] = &["created_at", "name", "display_order", "post_count"];
/// Sort keys accepted for tag lists.
pub const TAG_SORT_KEYS: &[&str] = &["created_at", "name", "post_count"];

/// Parsed blog post list filter.
#[derive(Debug, Clone, Default)]
pub struct BlogPostFilter {
    /// Matches title, excerpt, or slug.
    pub search: Option<String>,
    /// Publication status.
    pub status: Option<PostStatus>,
    /// Category.
    pub category_id: Option<Uuid>,
    /// Featured flag.
    pub is_featured: Option<bool>,
    /// Inclusive lower bound on creation time.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time.
    pub date_to: Option<DateTime<Utc>>,
    /// Ordering.
    pub sort: SortField,
    /// Requested page.
    pub page: PageRequest,
}

impl BlogPostFilter {
    /// The public site's view: published posts only, newest publication first.
    pub fn published(mut self) -> Self {
        self.status = Some(PostStatus::Published);
        if self.sort == SortField::newest_first() {
            self.sort = SortField::desc("published_at");
        }
        self
    }
}

impl ListFilter for BlogPostFilter {
    fn to_list_query(&self) -> ListQuery {
        ListQuery::new(self.page)
            .search(self.search.as_deref(), &["title", "excerpt", "slug"])
            .filter_opt(self.status, |s| FilterField::eq("status", s.as_str()))
            .filter_opt(self.category_id, |id| FilterField::eq("category_id", id))
            .filter_opt(self.is_featured, |v| FilterField::eq("is_featured", v))
            .filter_opt(self.date_from, |d| FilterField::gte("created_at", d))
            .filter_opt(self.date_to, |d| FilterField::lte("created_at", d))
            .sort(self.sort.clone())
    }
}

/// Parsed blog category list filter.
#[derive(Debug, Clone, Default)]
pub struct BlogCategoryFilter {
    /// Matches name or slug.
    pub search: Option<String>,
    /// Public visibility.
    pub is_active: Option<bool>,
    /// Ordering.
    pub sort: SortField,
    /// Requested page.
    pub page: PageRequest,
}

impl ListFilter for BlogCategoryFilter {
    fn to_list_query(&self) -> ListQuery {
        ListQuery::new(self.page)
            .search(self.search.as_deref(), &["name", "slug"])
            .filter_opt(self.is_active, |v| FilterField::eq("is_active", v))
            .sort(self.sort.clone())
    }
}

/// Parsed blog tag list filter.
#[derive(Debug, Clone, Default)]
pub struct BlogTagFilter {
    /// Matches name or slug.
    pub search: Option<String>,
    /// Ordering.
    pub sort: SortField,
    /// Requested page.
    pub page: PageRequest,
}

impl ListFilter for BlogTagFilter {
    fn to_list_query(&self) -> ListQuery {
        ListQuery::new(self.page)
            .search(self.search.as_deref(), &["name", "slug"])
            .sort(self.sort.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_view() {
        let query = BlogPostFilter::default().published().to_list_query();
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].field, "status");
        assert_eq!(query.sort, SortField::desc("published_at"));
    }
}
