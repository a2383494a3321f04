//! Page-number pagination for list endpoints.

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};

use crate::error::AppError;

/// Pagination query parameters.
///
/// Uses `serde_with` to parse page numbers from query strings as integers,
/// which also works when the struct is `#[serde(flatten)]`ed into a filter.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// A validated page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PaginationParams {
    /// Resolves the requested page against an endpoint's size limits.
    ///
    /// A missing or zero `page_size` falls back to `default_size`; values
    /// above `max_size` are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for page 0.
    pub fn resolve(&self, default_size: u32, max_size: u32) -> Result<PageRequest, AppError> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(invalid_page(page));
        }

        let page_size = match self.page_size {
            None | Some(0) => default_size,
            Some(size) => size.min(max_size),
        };

        Ok(PageRequest { page, page_size })
    }
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

/// Paginated list envelope.
///
/// `next` and `previous` are page numbers, `null` at either end.
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wraps one page of results.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when `request.page` is past the last
    /// page. The first page of an empty list is valid.
    pub fn new(request: PageRequest, count: i64, results: Vec<T>) -> Result<Self, AppError> {
        let total_pages = total_pages(count, request.page_size);
        if request.page > total_pages {
            return Err(invalid_page(request.page));
        }

        Ok(Self {
            count,
            page: request.page,
            page_size: request.page_size,
            total_pages,
            next: (request.page < total_pages).then_some(request.page + 1),
            previous: (request.page > 1).then_some(request.page - 1),
            results,
        })
    }
}

fn total_pages(count: i64, page_size: u32) -> u32 {
    if count <= 0 {
        return 1;
    }
    let size = page_size.max(1) as i64;
    ((count + size - 1) / size) as u32
}

fn invalid_page(page: u32) -> AppError {
    AppError::not_found("Invalid page", json!({ "page": page }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, page_size: Option<u32>) -> PaginationParams {
        PaginationParams { page, page_size }
    }

    #[test]
    fn test_defaults() {
        let req = params(None, None).resolve(10, 100).unwrap();
        assert_eq!(req, PageRequest { page: 1, page_size: 10 });
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn test_page_3_offset() {
        let req = params(Some(3), Some(20)).resolve(10, 100).unwrap();
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_page_size_clamped_to_max() {
        let req = params(None, Some(500)).resolve(20, 100).unwrap();
        assert_eq!(req.page_size, 100);
    }

    #[test]
    fn test_zero_page_size_uses_default() {
        let req = params(None, Some(0)).resolve(20, 100).unwrap();
        assert_eq!(req.page_size, 20);
    }

    #[test]
    fn test_page_zero_is_not_found() {
        let err = params(Some(0), None).resolve(10, 100).unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn test_query_string_parsing() {
        let p: PaginationParams = serde_json::from_value(json!({"page": "2", "page_size": "15"})).unwrap();
        assert_eq!(p.page, Some(2));
        assert_eq!(p.page_size, Some(15));
    }

    #[test]
    fn test_envelope_links() {
        let req = PageRequest { page: 2, page_size: 10 };
        let page = Paginated::new(req, 25, vec![1, 2, 3]).unwrap();

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let req = PageRequest { page: 3, page_size: 10 };
        let page = Paginated::new(req, 25, vec![0; 5]).unwrap();

        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(2));
    }

    #[test]
    fn test_empty_first_page_is_valid() {
        let req = PageRequest { page: 1, page_size: 10 };
        let page = Paginated::<i32>::new(req, 0, vec![]).unwrap();

        assert_eq!(page.count, 0);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_page_past_end_is_not_found() {
        let req = PageRequest { page: 4, page_size: 10 };
        let err = Paginated::<i32>::new(req, 25, vec![]).unwrap_err();

        match err {
            AppError::NotFound { message, .. } => assert_eq!(message, "Invalid page"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
