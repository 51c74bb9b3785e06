//! Pagination query parameters and the paginated response envelope.

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::page::{PageRequest, Paged};
use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination query parameters.
///
/// Uses `serde_with` to parse page numbers from query strings as integers.
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

impl PaginationParams {
    /// Validates the parameters and converts them into a [`PageRequest`].
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `page_size`: 20
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the page is 0 or the page size is
    /// outside `1..=100`.
    pub fn to_page_request(&self) -> Result<PageRequest, AppError> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(AppError::bad_request(
                "Page must be greater than 0",
                json!({ "page": page }),
            ));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::bad_request(
                format!("Page size must be between 1 and {MAX_PAGE_SIZE}"),
                json!({ "page_size": page_size }),
            ));
        }

        let offset = (page as i64 - 1) * page_size as i64;
        Ok(PageRequest::new(offset, page_size as i64))
    }
}

/// Pagination metadata returned with every list.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: i64,
}

/// A page of items with its metadata.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Builds the envelope from a repository page, converting each item.
    pub fn from_paged<E>(paged: Paged<E>, page: PageRequest, f: impl FnMut(E) -> T) -> Self {
        let page_size = page.limit.max(1);
        let total_pages = if paged.total == 0 {
            0
        } else {
            (paged.total + page_size - 1) / page_size
        };

        Self {
            pagination: PaginationMeta {
                page: (page.offset / page_size + 1) as u32,
                page_size: page_size as u32,
                total_items: paged.total,
                total_pages,
            },
            items: paged.items.into_iter().map(f).collect(),
        }
    }
}
