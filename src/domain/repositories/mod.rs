//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; PostgreSQL implementations
//! live in `crate::infrastructure::persistence`. Mock implementations are
//! generated with `mockall` for service unit tests.
//!
//! # Available Repositories
//!
//! - [`AdminRepository`] - Admin accounts
//! - [`ModuleRepository`] - Marketplace modules
//! - [`VendorRepository`] - Vendors and nearest-vendor search
//! - [`ProductRepository`] - Vendor products
//! - [`UserRepository`] - Customers
//! - [`OtpRepository`] - Pending OTP challenges
//! - [`SessionRepository`] - Bearer-token sessions
//! - [`AddressRepository`] - User address book
//! - [`OrderRepository`] - Carts, checkout and order lifecycle

pub mod address_repository;
pub mod admin_repository;
pub mod module_repository;
pub mod order_repository;
pub mod otp_repository;
pub mod product_repository;
pub mod session_repository;
pub mod user_repository;
pub mod vendor_repository;

pub use address_repository::AddressRepository;
pub use admin_repository::AdminRepository;
pub use module_repository::ModuleRepository;
pub use order_repository::OrderRepository;
pub use otp_repository::OtpRepository;
pub use product_repository::ProductRepository;
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;
pub use vendor_repository::{NearbyQuery, VendorRepository};

#[cfg(test)]
pub use address_repository::MockAddressRepository;
#[cfg(test)]
pub use admin_repository::MockAdminRepository;
#[cfg(test)]
pub use module_repository::MockModuleRepository;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
#[cfg(test)]
pub use otp_repository::MockOtpRepository;
#[cfg(test)]
pub use product_repository::MockProductRepository;
#[cfg(test)]
pub use session_repository::MockSessionRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(test)]
pub use vendor_repository::MockVendorRepository;
