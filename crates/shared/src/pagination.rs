//! Offset pagination types.
//!
//! Page numbers are zero-based, matching the JSON contract
//! `{content, currentPage, totalElements, totalPages}`.

use serde::{Deserialize, Serialize};

/// Default page size when the query string omits `size`.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on `size`; larger requests are clamped, not rejected.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page request parsed from `?page=&size=` query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Effective page size after clamping to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> i64 {
        i64::from(self.size.clamp(1, MAX_PAGE_SIZE))
    }

    /// Row offset of the first element of this page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * self.limit()
    }
}

/// One page of results plus totals computed against the same filter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub current_page: u32,
    pub total_elements: i64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Assembles a page from its content slice and the overall total.
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let limit = request.limit();
        let total_pages = if total_elements <= 0 {
            0
        } else {
            ((total_elements + limit - 1) / limit) as u32
        };

        Self {
            content,
            current_page: request.page,
            total_elements,
            total_pages,
        }
    }

    /// Maps the content, preserving paging metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_math() {
        let request = PageRequest { page: 3, size: 10 };
        assert_eq!(request.limit(), 10);
        assert_eq!(request.offset(), 30);
    }

    #[test]
    fn test_first_page_offset_is_zero() {
        let request = PageRequest { page: 0, size: 25 };
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_size_is_clamped() {
        let too_big = PageRequest { page: 0, size: 5000 };
        assert_eq!(too_big.limit(), i64::from(MAX_PAGE_SIZE));

        let zero = PageRequest { page: 2, size: 0 };
        assert_eq!(zero.limit(), 1);
        assert_eq!(zero.offset(), 2);
    }

    #[test]
    fn test_query_string_defaults() {
        let request: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let request = PageRequest { page: 0, size: 10 };
        let page: Page<i32> = Page::new(vec![], request, 21);
        assert_eq!(page.total_pages, 3);

        let exact: Page<i32> = Page::new(vec![], request, 20);
        assert_eq!(exact.total_pages, 2);

        let empty: Page<i32> = Page::new(vec![], request, 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_map_preserves_metadata() {
        let request = PageRequest { page: 1, size: 2 };
        let page = Page::new(vec![1, 2], request, 5);
        let mapped = page.map(|n| n.to_string());

        assert_eq!(mapped.content, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(mapped.current_page, 1);
        assert_eq!(mapped.total_elements, 5);
        assert_eq!(mapped.total_pages, 3);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let request = PageRequest { page: 0, size: 10 };
        let page = Page::new(vec![1], request, 1);
        let json = serde_json::to_string(&page).unwrap();

        assert!(json.contains("\"currentPage\":0"));
        assert!(json.contains("\"totalElements\":1"));
        assert!(json.contains("\"totalPages\":1"));
    }
}
