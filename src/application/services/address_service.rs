//! User address book.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{Address, NewAddress, UpdateAddress};
use crate::domain::repositories::AddressRepository;
use crate::error::AppError;

/// Service for a user's saved delivery addresses.
///
/// Every operation is scoped to the calling user; addresses of other users
/// are reported as not found. A user with addresses always has exactly one
/// default.
pub struct AddressService<R: AddressRepository> {
    repository: Arc<R>,
}

impl<R: AddressRepository> AddressService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Saves an address. The first address of a user becomes the default.
    pub async fn create(&self, mut new_address: NewAddress) -> Result<Address, AppError> {
        if self.repository.count(new_address.user_id).await? == 0 {
            new_address.is_default = true;
        }
        self.repository.create(new_address).await
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<Address>, AppError> {
        self.repository.list(user_id).await
    }

    pub async fn get(&self, user_id: i64, id: i64) -> Result<Address, AppError> {
        self.repository
            .find(user_id, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        update: UpdateAddress,
    ) -> Result<Address, AppError> {
        self.repository
            .update(user_id, id, update)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Deletes an address; if it was the default, the most recent remaining
    /// address takes over.
    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), AppError> {
        if !self.repository.delete(user_id, id).await? {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Makes `id` the default address, clearing the previous default.
    pub async fn set_default(&self, user_id: i64, id: i64) -> Result<Address, AppError> {
        if !self.repository.set_default(user_id, id).await? {
            return Err(not_found(id));
        }
        self.get(user_id, id).await
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found("Address not found", json!({"id": id}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockAddressRepository;
    use chrono::Utc;

    fn new_address(user_id: i64, is_default: bool) -> NewAddress {
        NewAddress {
            user_id,
            label: "Home".to_string(),
            line1: "12 Residency Road".to_string(),
            line2: None,
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            pincode: "560025".to_string(),
            latitude: None,
            longitude: None,
            is_default,
        }
    }

    fn stored(id: i64, a: NewAddress) -> Address {
        Address {
            id,
            user_id: a.user_id,
            label: a.label,
            line1: a.line1,
            line2: a.line2,
            city: a.city,
            state: a.state,
            pincode: a.pincode,
            latitude: a.latitude,
            longitude: a.longitude,
            is_default: a.is_default,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_first_address_becomes_default() {
        let mut repo = MockAddressRepository::new();
        repo.expect_count().returning(|_| Ok(0));
        repo.expect_create()
            .withf(|a| a.is_default)
            .times(1)
            .returning(|a| Ok(stored(1, a)));

        let svc = AddressService::new(Arc::new(repo));
        let address = svc.create(new_address(7, false)).await.unwrap();

        assert!(address.is_default);
    }

    #[tokio::test]
    async fn test_later_address_keeps_requested_flag() {
        let mut repo = MockAddressRepository::new();
        repo.expect_count().returning(|_| Ok(2));
        repo.expect_create()
            .withf(|a| !a.is_default)
            .times(1)
            .returning(|a| Ok(stored(3, a)));

        let svc = AddressService::new(Arc::new(repo));
        let address = svc.create(new_address(7, false)).await.unwrap();

        assert!(!address.is_default);
    }

    #[tokio::test]
    async fn test_foreign_address_not_found() {
        let mut repo = MockAddressRepository::new();
        repo.expect_find().returning(|_, _| Ok(None));
        repo.expect_delete().returning(|_, _| Ok(false));
        repo.expect_set_default().returning(|_, _| Ok(false));

        let svc = AddressService::new(Arc::new(repo));

        assert!(matches!(
            svc.get(7, 99).await.unwrap_err(),
            AppError::NotFound { .. }
        ));
        assert!(matches!(
            svc.delete(7, 99).await.unwrap_err(),
            AppError::NotFound { .. }
        ));
        assert!(matches!(
            svc.set_default(7, 99).await.unwrap_err(),
            AppError::NotFound { .. }
        ));
    }
}
