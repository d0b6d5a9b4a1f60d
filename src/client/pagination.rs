//! Pagination helpers for GitHub list endpoints
//!
//! GitHub pages with `per_page` plus an RFC 8288 `Link` header; the client
//! keeps requesting the `rel="next"` URL until it disappears.

use serde::{Deserialize, Serialize};

/// Maximum page size GitHub accepts. Using it minimizes round trips.
pub const MAX_PAGE_SIZE: usize = 100;

/// Query parameters for a paginated request.
///
/// # Example
/// ```ignore
/// let params = PaginationParams::new()
///     .sort_by("created")
///     .sort_order(SortOrder::Desc)
///     .filter("state", "all");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PaginationParams {
    /// Items per page (default and maximum: 100)
    pub per_page: Option<usize>,
    /// Sort field name
    pub sort_by: Option<String>,
    /// Sort order
    pub sort_order: Option<SortOrder>,
    /// Endpoint-specific filters such as `state=open`
    pub filters: Vec<(&'static str, String)>,
}

/// Sort order for paginated requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (oldest first)
    Asc,
    /// Descending order (newest first)
    Desc,
}

impl PaginationParams {
    /// Create new pagination params with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size (items per page), clamped to the API maximum.
    pub fn per_page(mut self, size: usize) -> Self {
        self.per_page = Some(size.clamp(1, MAX_PAGE_SIZE));
        self
    }

    /// Set the sort field.
    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_by = Some(field.into());
        self
    }

    /// Set the sort order.
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// Add an endpoint-specific filter.
    pub fn filter(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.filters.push((key, value.into()));
        self
    }

    /// Convert to query string parameters.
    ///
    /// Uses GitHub parameter names:
    /// - `per_page`: number of items per page (defaults to MAX_PAGE_SIZE)
    /// - `sort`: field to sort by
    /// - `direction`: `asc` or `desc`
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        let size = self.per_page.unwrap_or(MAX_PAGE_SIZE);
        params.push(("per_page", size.to_string()));

        if let Some(ref field) = self.sort_by {
            params.push(("sort", field.clone()));
        }

        if let Some(order) = self.sort_order {
            let order_str = match order {
                SortOrder::Asc => "asc",
                SortOrder::Desc => "desc",
            };
            params.push(("direction", order_str.to_string()));
        }

        params.extend(self.filters.iter().cloned());
        params
    }
}

/// Extract the `rel="next"` target from a `Link` header value.
///
/// ```text
/// <https://api.github.com/orgs/acme/repos?page=2>; rel="next", <...?page=5>; rel="last"
/// ```
pub fn next_page_url(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|attr| {
            let attr = attr.trim();
            attr == "rel=\"next\"" || attr == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
