//! Repository trait for products.

use crate::domain::entities::{NewProduct, Product, UpdateProduct};
use crate::domain::page::{PageRequest, Paged};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for products.
///
/// Deleted products are soft-deleted and invisible to every method here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, new_product: NewProduct) -> Result<Product, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, AppError>;

    /// Lists a vendor's products ordered by name.
    ///
    /// - `only_active` - If true, inactive products are skipped
    async fn list_by_vendor(
        &self,
        vendor_id: i64,
        only_active: bool,
        page: PageRequest,
    ) -> Result<Paged<Product>, AppError>;

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the product does not exist.
    async fn update(&self, id: i64, update: UpdateProduct) -> Result<Product, AppError>;

    /// Soft-deletes a product. Returns false if it was not found.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
