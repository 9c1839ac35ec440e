//
//  gitlab-tools
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination Types for GitLab API Responses
//!
//! GitLab paginates list endpoints with page numbers. The request carries
//! `page` and `per_page` query parameters and the response describes the
//! position in four headers:
//!
//! | Header | Field | Meaning |
//! |--------|-------|---------|
//! | `x-total` | `total` | Total number of items |
//! | `x-total-pages` | `totalPages` | Total number of pages |
//! | `x-next-page` | `nextPage` | Next page number, empty on the last page |
//! | `x-prev-page` | `prevPage` | Previous page number, empty on the first page |
//!
//! # Notes
//!
//! - A header that is missing or not numeric is reported as absent, never as zero
//! - `hasMore` follows the explicit next-page signal only; totals can be
//!   stale under concurrent writes and GitLab omits them for large collections
//! - `perPage` is capped at 100 by GitLab, larger values are rejected locally

use serde::Serialize;

use super::{ApiError, NormalizedHeaders};

/// First page number.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Page size used for diff listings, whose items are large.
pub const DEFAULT_DIFF_PER_PAGE: u32 = 20;

/// GitLab's hard cap on `per_page`.
pub const MAX_PER_PAGE: u32 = 100;

/// A validated page request.
///
/// # Example
///
/// ```rust
/// use gitlab_tools::api::common::PaginationRequest;
///
/// let page = PaginationRequest::new(Some(2), None).unwrap();
/// assert_eq!(page.page, 2);
/// assert_eq!(page.per_page, 50);
///
/// assert!(PaginationRequest::new(Some(0), None).is_err());
/// assert!(PaginationRequest::new(None, Some(101)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRequest {
    /// Page number, starting at 1
    pub page: u32,
    /// Items per page, between 1 and 100
    pub per_page: u32,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PaginationRequest {
    /// Validates an optional page and page size, using the standard defaults.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Result<Self, ApiError> {
        Self::with_default(page, per_page, DEFAULT_PER_PAGE)
    }

    /// Validates an optional page and page size with a resource-specific default size.
    pub fn with_default(
        page: Option<u32>,
        per_page: Option<u32>,
        default_per_page: u32,
    ) -> Result<Self, ApiError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let per_page = per_page.unwrap_or(default_per_page);

        if page < 1 {
            return Err(ApiError::validation("page", "must be 1 or greater"));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(ApiError::validation(
                "perPage",
                format!("must be between 1 and {MAX_PER_PAGE}, got {per_page}"),
            ));
        }

        Ok(Self { page, per_page })
    }

    /// Query parameters for this request.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// Position of a page within a listing, derived from response headers.
///
/// Absent optional fields are omitted from the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    /// The page that was requested
    pub page: u32,
    /// The page size that was requested
    pub per_page: u32,
    /// Total number of items, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Total number of pages, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    /// Next page number, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u64>,
    /// Previous page number, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<u64>,
    /// Whether the remote announced a next page
    pub has_more: bool,
}

impl PaginationInfo {
    /// Builds the descriptor from normalized headers and the requested page.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gitlab_tools::api::common::{NormalizedHeaders, PaginationInfo, RawHeaderValue};
    ///
    /// let headers = NormalizedHeaders::from_raw([("x-next-page", RawHeaderValue::from("3"))]);
    /// let info = PaginationInfo::extract(&headers, 2, 20);
    /// assert!(info.has_more);
    /// assert_eq!(info.next_page, Some(3));
    /// assert_eq!(info.total, None);
    /// ```
    pub fn extract(headers: &NormalizedHeaders, page: u32, per_page: u32) -> Self {
        let next_page = numeric_header(headers, "x-next-page");
        Self {
            page,
            per_page,
            total: numeric_header(headers, "x-total"),
            total_pages: numeric_header(headers, "x-total-pages"),
            next_page,
            prev_page: numeric_header(headers, "x-prev-page"),
            has_more: next_page.is_some(),
        }
    }

    /// Convenience wrapper over [`extract`](Self::extract) for a validated request.
    pub fn from_request(headers: &NormalizedHeaders, request: PaginationRequest) -> Self {
        Self::extract(headers, request.page, request.per_page)
    }
}

fn numeric_header(headers: &NormalizedHeaders, name: &str) -> Option<u64> {
    headers.get(name).and_then(|v| v.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::RawHeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> NormalizedHeaders {
        NormalizedHeaders::from_raw(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), RawHeaderValue::from(*v))),
        )
    }

    #[test]
    fn test_next_page_only() {
        let info = PaginationInfo::extract(&headers(&[("x-next-page", "3")]), 2, 50);
        assert!(info.has_more);
        assert_eq!(info.next_page, Some(3));
        assert_eq!(info.total, None);
        assert_eq!(info.total_pages, None);
        assert_eq!(info.prev_page, None);
    }

    #[test]
    fn test_no_pagination_headers() {
        let info = PaginationInfo::extract(&NormalizedHeaders::default(), 1, 50);
        assert!(!info.has_more);
        assert_eq!(info.total, None);
        assert_eq!(info.total_pages, None);
        assert_eq!(info.next_page, None);
        assert_eq!(info.prev_page, None);

        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json, serde_json::json!({"page": 1, "perPage": 50, "hasMore": false}));
    }

    #[test]
    fn test_last_page_has_empty_next() {
        let info = PaginationInfo::extract(
            &headers(&[
                ("X-Total", "120"),
                ("X-Total-Pages", "3"),
                ("X-Next-Page", ""),
                ("X-Prev-Page", "2"),
            ]),
            3,
            50,
        );
        assert!(!info.has_more);
        assert_eq!(info.total, Some(120));
        assert_eq!(info.total_pages, Some(3));
        assert_eq!(info.prev_page, Some(2));
    }

    #[test]
    fn test_has_more_ignores_total_pages() {
        let info =
            PaginationInfo::extract(&headers(&[("x-total-pages", "9"), ("x-total", "400")]), 1, 50);
        assert!(!info.has_more);
    }

    #[test]
    fn test_non_numeric_headers_are_absent() {
        let info =
            PaginationInfo::extract(&headers(&[("x-next-page", "soon"), ("x-total", "n/a")]), 1, 50);
        assert!(!info.has_more);
        assert_eq!(info.next_page, None);
        assert_eq!(info.total, None);
    }

    #[test]
    fn test_request_bounds() {
        assert_eq!(PaginationRequest::new(None, None).unwrap(), PaginationRequest::default());
        assert!(PaginationRequest::new(Some(0), None).is_err());
        assert!(PaginationRequest::new(None, Some(0)).is_err());
        assert!(PaginationRequest::new(None, Some(100)).is_ok());

        let err = PaginationRequest::new(None, Some(101)).unwrap_err();
        assert_eq!(err.field(), Some("perPage"));

        let diffs = PaginationRequest::with_default(None, None, DEFAULT_DIFF_PER_PAGE).unwrap();
        assert_eq!(diffs.per_page, 20);
    }
}
