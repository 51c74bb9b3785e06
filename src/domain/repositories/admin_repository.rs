//! Repository trait for admin accounts.

use crate::domain::entities::{Admin, NewAdmin};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for admin accounts.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAdminRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Creates a new admin.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    async fn create(&self, new_admin: NewAdmin) -> Result<Admin, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Admin>, AppError>;

    /// Finds an admin by email. Emails are stored lowercase.
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError>;

    /// Lists all admins ordered by creation time.
    async fn list(&self) -> Result<Vec<Admin>, AppError>;

    /// Activates or deactivates an admin.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the admin does not exist.
    async fn set_active(&self, id: i64, is_active: bool) -> Result<Admin, AppError>;
}
