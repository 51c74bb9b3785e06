//! Repository trait for vendors.

use crate::domain::entities::{NearbyVendor, NewVendor, UpdateVendor, Vendor};
use crate::domain::page::{PageRequest, Paged};
use crate::error::AppError;
use async_trait::async_trait;

/// Parameters of a nearest-vendor search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub module_id: Option<i64>,
    /// Extra cap on distance on top of each vendor's own delivery radius.
    pub radius_km: Option<f64>,
    pub limit: i64,
}

/// Repository interface for vendors.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgVendorRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VendorRepository: Send + Sync {
    /// Creates a vendor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    /// Returns [`AppError::Validation`] if the module does not exist.
    async fn create(&self, new_vendor: NewVendor) -> Result<Vendor, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Vendor>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Vendor>, AppError>;

    /// Lists vendors, optionally restricted to one module.
    async fn list(&self, module_id: Option<i64>, page: PageRequest)
    -> Result<Paged<Vendor>, AppError>;

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the vendor does not exist.
    async fn update(&self, id: i64, update: UpdateVendor) -> Result<Vendor, AppError>;

    /// Finds active, open vendors whose delivery radius covers the point,
    /// nearest first.
    async fn find_nearby(&self, query: NearbyQuery) -> Result<Vec<NearbyVendor>, AppError>;
}
