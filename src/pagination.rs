use crate::config::PaginationConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be 1 or greater")]
    InvalidPage,
}

/// `?page=N&items=M` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub items: Option<u64>,
}

/// Where a page sits inside a collection of `count` records.
///
/// Pages past the end clamp to the last page; an empty collection still has one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub items: u64,
    pub count: u64,
    pub pages: u64,
    pub prev: Option<u64>,
    pub next: Option<u64>,
}

impl Pagination {
    pub fn new(config: &PaginationConfig, params: &PageParams, count: u64) -> Result<Self, PaginationError> {
        let requested_page = params.page.unwrap_or(1);
        if requested_page == 0 {
            return Err(PaginationError::InvalidPage);
        }

        let items = params
            .items
            .unwrap_or(config.default_items)
            .clamp(1, config.max_items.max(1));
        let pages = count.div_ceil(items).max(1);
        let page = requested_page.min(pages);

        Ok(Self {
            page,
            items,
            count,
            pages,
            prev: (page > 1).then(|| page - 1),
            next: (page < pages).then(|| page + 1),
        })
    }

    pub fn offset(&self) -> i64 {
        ((self.page - 1) * self.items) as i64
    }

    pub fn limit(&self) -> i64 {
        self.items as i64
    }
}

/// JSON envelope for list endpoints.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self { data, pagination }
    }
}
