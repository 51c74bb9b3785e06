//! Repository trait for the user address book.

use crate::domain::entities::{Address, NewAddress, UpdateAddress};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for addresses.
///
/// Every lookup is scoped by `user_id`; an address owned by another user is
/// reported exactly like a missing one. The implementation keeps at most one
/// default address per user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Creates an address. When `is_default` is set, the previous default is
    /// cleared in the same transaction.
    async fn create(&self, new_address: NewAddress) -> Result<Address, AppError>;

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Address>, AppError>;

    /// Lists addresses, default first, then newest first.
    async fn list(&self, user_id: i64) -> Result<Vec<Address>, AppError>;

    async fn count(&self, user_id: i64) -> Result<i64, AppError>;

    async fn update(
        &self,
        user_id: i64,
        id: i64,
        update: UpdateAddress,
    ) -> Result<Option<Address>, AppError>;

    /// Deletes an address. If it was the default, the most recently created
    /// remaining address becomes default. Returns false if not found.
    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, AppError>;

    /// Makes `id` the only default address. Returns false if not found.
    async fn set_default(&self, user_id: i64, id: i64) -> Result<bool, AppError>;
}
