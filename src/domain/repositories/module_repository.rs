//! Repository trait for marketplace modules.

use crate::domain::entities::{Module, NewModule, UpdateModule};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for modules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// Creates a module.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name is taken.
    async fn create(&self, new_module: NewModule) -> Result<Module, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Module>, AppError>;

    /// Lists modules ordered by `sort_order`, then name.
    ///
    /// - `only_active` - If true, inactive modules are skipped
    async fn list(&self, only_active: bool) -> Result<Vec<Module>, AppError>;

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the module does not exist.
    async fn update(&self, id: i64, update: UpdateModule) -> Result<Module, AppError>;

    /// Hard-deletes a module.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the module does not exist.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Counts vendors registered under a module.
    async fn count_vendors(&self, id: i64) -> Result<i64, AppError>;
}
