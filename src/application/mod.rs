//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::auth_service::AuthService`] - Bearer-token sessions
//! - [`services::admin_service::AdminService`] - Admin accounts
//! - [`services::catalog_service::CatalogService`] - Modules, vendors, products
//! - [`services::user_service::UserService`] - OTP login and user profiles
//! - [`services::address_service::AddressService`] - Address book
//! - [`services::cart_service::CartService`] - Carts, checkout, online payment
//! - [`services::order_service::OrderService`] - Order visibility and lifecycle
//! - [`services::upload_service::UploadService`] - Image uploads

pub mod services;
