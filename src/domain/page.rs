//! Pagination types

use serde::{Deserialize, Serialize};

/// Number of records returned per page by default
pub const DEFAULT_PER_PAGE: usize = 10;

/// Which window of an ordered result set to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    per_page: usize,
}

impl PageRequest {
    /// Create a request; page numbers start at 1 and lower values are clamped
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Request a page using the default page size
    pub fn page(page: usize) -> Self {
        Self::new(page, DEFAULT_PER_PAGE)
    }

    pub fn number(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Number of records to skip
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::page(1)
    }
}

/// A bounded slice of a larger ordered result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub current_page: usize,
    pub per_page: usize,
    pub last_page: usize,
}

impl<T> Page<T> {
    /// Build a page from an already-windowed item subset
    pub fn new(data: Vec<T>, total: usize, request: PageRequest) -> Self {
        Self {
            data,
            total,
            current_page: request.number(),
            per_page: request.per_page(),
            last_page: total.div_ceil(request.per_page()).max(1),
        }
    }

    /// Window a fully ordered list
    pub fn from_ordered(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len();
        let data = items
            .into_iter()
            .skip(request.offset())
            .take(request.per_page())
            .collect();

        Self::new(data, total, request)
    }
}
