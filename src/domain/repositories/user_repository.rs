//! Repository trait for customers.

use crate::domain::entities::{UpdateUser, User};
use crate::domain::page::{PageRequest, Paged};
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Returns the user with this phone, creating it if absent.
    ///
    /// The boolean is true when the user was created by this call.
    async fn find_or_create(&self, phone: &str) -> Result<(User, bool), AppError>;

    /// Applies a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    async fn update(&self, id: i64, update: UpdateUser) -> Result<User, AppError>;

    async fn list(&self, page: PageRequest) -> Result<Paged<User>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    async fn set_active(&self, id: i64, is_active: bool) -> Result<User, AppError>;
}
