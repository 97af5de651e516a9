//! Pagination math shared by every list view.

use rentfolio_common::{ApiError, Result};
use serde::{Deserialize, Serialize};

/// A validated page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self> {
        if page == 0 {
            return Err(ApiError::validation("page must be at least 1"));
        }
        if limit == 0 {
            return Err(ApiError::validation("limit must be at least 1"));
        }
        Ok(Self { page, limit })
    }

    pub fn first(limit: u32) -> Result<Self> {
        Self::new(1, limit)
    }
}

/// One page of results as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u32,
}

impl<T> PageResult<T> {
    /// A page whose totals are derived from the item count, used when the
    /// backend returns a bare array instead of a paging envelope.
    pub fn single_page(items: Vec<T>) -> Self {
        let total_items = items.len() as u64;
        Self {
            total_items,
            total_pages: total_pages(total_items, total_items.max(1) as u32),
            items,
        }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            total_pages: 0,
        }
    }
}

/// `ceil(total_items / limit)`. Zero items means zero pages.
pub fn total_pages(total_items: u64, limit: u32) -> u32 {
    debug_assert!(limit > 0);
    total_items.div_ceil(limit as u64) as u32
}

/// Clamp a requested page into `[1, max(total_pages, 1)]` so an empty
/// result set still has a well-defined current page.
pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages.max(1))
}
