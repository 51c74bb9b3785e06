//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries
//! are checked at runtime and rows are decoded through `FromRow` structs
//! private to each repository, then converted into domain entities.
//!
//! # Repositories
//!
//! - [`PgAdminRepository`] - Admin accounts
//! - [`PgModuleRepository`] - Marketplace modules
//! - [`PgVendorRepository`] - Vendors and haversine nearest-vendor search
//! - [`PgProductRepository`] - Products (soft delete)
//! - [`PgUserRepository`] - Customers
//! - [`PgOtpRepository`] - OTP challenges
//! - [`PgSessionRepository`] - Bearer-token sessions
//! - [`PgAddressRepository`] - Address book
//! - [`PgOrderRepository`] - Carts, checkout and order lifecycle

pub mod pg_address_repository;
pub mod pg_admin_repository;
pub mod pg_module_repository;
pub mod pg_order_repository;
pub mod pg_otp_repository;
pub mod pg_product_repository;
pub mod pg_session_repository;
pub mod pg_user_repository;
pub mod pg_vendor_repository;

pub use pg_address_repository::PgAddressRepository;
pub use pg_admin_repository::PgAdminRepository;
pub use pg_module_repository::PgModuleRepository;
pub use pg_order_repository::PgOrderRepository;
pub use pg_otp_repository::PgOtpRepository;
pub use pg_product_repository::PgProductRepository;
pub use pg_session_repository::PgSessionRepository;
pub use pg_user_repository::PgUserRepository;
pub use pg_vendor_repository::PgVendorRepository;

use crate::error::AppError;
use serde_json::json;

/// Parses a TEXT column holding an enum value.
pub(crate) fn parse_column<T>(column: &'static str, value: &str) -> Result<T, AppError>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(|e: String| {
        tracing::error!(column, value, "Corrupt enum column: {}", e);
        AppError::internal("Corrupt stored value", json!({ "column": column }))
    })
}
