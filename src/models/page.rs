//! Pagination and search helpers shared by list endpoints

use serde::{Deserialize, Serialize};

use crate::config::MAX_PER_PAGE;

/// Raw list query as received from the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
}

/// Normalized page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
    pub search: Option<String>,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            search: None,
        }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = normalize_search(search);
        self
    }

    /// Build from a client query, falling back to `default_per_page`
    pub fn from_query(query: ListQuery, default_per_page: i64) -> Self {
        Self::new(
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(default_per_page),
        )
        .with_search(query.search)
    }

    /// Saturates for out-of-range page numbers instead of overflowing
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Trim a search string and drop it entirely when blank
pub fn normalize_search(search: Option<String>) -> Option<String> {
    search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Case-insensitive substring match used by the in-memory store
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Page metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, request: &PageRequest) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + request.per_page - 1) / request.per_page
        };

        Self {
            data,
            meta: PageMeta {
                total,
                page: request.page,
                per_page: request.per_page,
                total_pages,
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(0, 1000);
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, MAX_PER_PAGE);
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(3, 5);
        assert_eq!(req.offset(), 10);
        assert_eq!(req.limit(), 5);
    }

    #[test]
    fn test_huge_page_offset_saturates() {
        let req = PageRequest::new(i64::MAX, MAX_PER_PAGE);
        assert_eq!(req.page, i64::MAX);
        assert_eq!(req.offset(), i64::MAX);

        let page = Page::<()>::new(vec![], 3, &req);
        assert_eq!(page.meta.total_pages, 1);
    }

    #[test]
    fn test_blank_search_is_dropped() {
        let req = PageRequest::new(1, 10).with_search(Some("   ".to_string()));
        assert_eq!(req.search, None);

        let req = PageRequest::new(1, 10).with_search(Some(" admin ".to_string()));
        assert_eq!(req.search.as_deref(), Some("admin"));
    }

    #[test]
    fn test_total_pages() {
        let req = PageRequest::new(1, 3);
        assert_eq!(Page::<()>::new(vec![], 0, &req).meta.total_pages, 0);
        assert_eq!(Page::<()>::new(vec![], 3, &req).meta.total_pages, 1);
        assert_eq!(Page::<()>::new(vec![], 10, &req).meta.total_pages, 4);
    }

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci("Отдел разработки", "РАЗРАБ"));
        assert!(contains_ci("Engineering", "neer"));
        assert!(!contains_ci("Engineering", "sales"));
    }
}
