use serde::{Deserialize, Serialize};

/// Posts per page when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Largest row offset a page may start at. Postgres `OFFSET` is a signed bigint.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Out-of-range inputs are clamped: at least one item and the first page,
    /// at most the last page whose offset still fits [`MAX_OFFSET`].
    pub fn new(page: u64, per_page: u64) -> Self {
        let per_page = per_page.clamp(1, MAX_OFFSET);
        let last_page = MAX_OFFSET / per_page + 1;
        Self {
            page: page.clamp(1, last_page),
            per_page,
        }
    }

    /// Number of items to skip.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total_items,
            total_pages: total_items.div_ceil(request.per_page),
        }
    }

    /// Slice an already filtered and ordered collection.
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.per_page as usize)
            .collect();
        Self::new(items, request, total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
