//! API response types.

use serde::Serialize;

/// A page of items with pagination metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Build a page. `limit` must be non-zero (the query layer clamps it).
    #[must_use]
    pub fn new(items: Vec<T>, page: u64, limit: u64, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(limit.max(1));

        Self {
            items,
            page,
            total_pages,
            total_items,
            has_next: page < total_pages,
            has_previous: page > 1 && total_pages > 0,
        }
    }
}
