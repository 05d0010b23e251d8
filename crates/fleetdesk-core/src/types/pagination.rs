//! Pagination types for list endpoints.
//!
//! Pages are 1-based. A page maps to the zero-indexed, inclusive row range
//! `[(page - 1) * limit, page * limit - 1]`.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 10;
/// Maximum page size.
pub const MAX_LIMIT: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u32,
    /// Number of items per page.
    pub limit: u32,
}

impl PageRequest {
    /// Create a new page request, clamping both values into range.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Inclusive, zero-indexed row range covered by this page.
    pub fn range(&self) -> (u64, u64) {
        let start = self.offset();
        (start, start + u64::from(self.limit) - 1)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of matching rows across all pages.
    pub total: u64,
    /// Current page number (1-based).
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
    /// `ceil(total / limit)`; zero when nothing matched.
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        let limit = u64::from(request.limit.max(1));
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: total.div_ceil(limit),
        }
    }

    /// Convert the items while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_inclusive_and_zero_indexed() {
        assert_eq!(PageRequest::new(1, 10).range(), (0, 9));
        assert_eq!(PageRequest::new(3, 10).range(), (20, 29));
    }

    #[test]
    fn test_clamping() {
        let req = PageRequest::new(0, 1000);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, MAX_LIMIT);
        assert_eq!(PageRequest::new(2, 0).limit, 1);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        let req = PageRequest::new(3, 10);
        let page = PageResponse::new(vec![1, 2, 3, 4, 5], 25, &req);
        assert_eq!(page.total_pages, 3);

        for (total, limit, expected) in [(0, 10, 0), (1, 10, 1), (10, 10, 1), (11, 10, 2), (100, 7, 15)] {
            let page = PageResponse::<()>::new(vec![], total, &PageRequest::new(1, limit));
            assert_eq!(page.total_pages, expected, "total={total} limit={limit}");
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let page = PageResponse::new(vec!["a"], 1, &PageRequest::default());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["limit"], DEFAULT_LIMIT);
    }
}
