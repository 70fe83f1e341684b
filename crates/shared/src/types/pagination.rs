//! Pagination types for list queries.

use serde::{Deserialize, Serialize};

/// Hard cap on page size, protecting list queries from unbounded reads.
pub const MAX_PER_PAGE: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.clamped_per_page())
    }

    /// Returns the limit for database queries, capped at [`MAX_PER_PAGE`].
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.clamped_per_page())
    }

    fn clamped_per_page(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items across all pages.
    pub total: u64,
}

impl<T> PageResponse<T> {
    /// Builds a page response from items and the total row count.
    #[must_use]
    pub fn new(data: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            data,
            meta: PageMeta {
                page: request.page,
                per_page: request.per_page,
                total,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_request() {
        let req = PageRequest::default();
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 20);
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_offset_for_later_pages() {
        let req = PageRequest {
            page: 3,
            per_page: 25,
        };
        assert_eq!(req.offset(), 50);
        assert_eq!(req.limit(), 25);
    }

    #[test]
    fn test_per_page_is_clamped() {
        let req = PageRequest {
            page: 2,
            per_page: 10_000,
        };
        assert_eq!(req.limit(), u64::from(MAX_PER_PAGE));
        assert_eq!(req.offset(), u64::from(MAX_PER_PAGE));
    }

    #[test]
    fn test_zero_values_do_not_underflow() {
        let req = PageRequest {
            page: 0,
            per_page: 0,
        };
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 1);
    }

    #[test]
    fn test_page_response_meta() {
        let req = PageRequest {
            page: 2,
            per_page: 10,
        };
        let page = PageResponse::new(vec![1, 2, 3], &req, 23);
        assert_eq!(page.data.len(), 3);
        assert_eq!(page.meta.page, 2);
        assert_eq!(page.meta.per_page, 10);
        assert_eq!(page.meta.total, 23);
    }
}
