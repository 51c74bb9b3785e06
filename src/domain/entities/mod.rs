//! Core domain entities representing the marketplace data model.
//!
//! Entities are plain data structures. Creation and partial-update inputs
//! live next to the entity they produce:
//! - `NewX` - For creating new records
//! - `UpdateX` - For partial updates (`None` leaves a field unchanged)
//!
//! # Entity Types
//!
//! - [`Admin`] - Back-office operator
//! - [`Module`] - Marketplace vertical grouping vendors
//! - [`Vendor`] - Seller with location and delivery charges
//! - [`Product`] - Item sold by a vendor
//! - [`User`] - Customer authenticated by phone OTP
//! - [`Address`] - Delivery address owned by a user
//! - [`Order`] - A cart (`new`) or a placed order
//! - [`Session`] - Issued bearer token

pub mod address;
pub mod admin;
pub mod module;
pub mod order;
pub mod product;
pub mod session;
pub mod user;
pub mod vendor;

pub use address::{Address, NewAddress, UpdateAddress};
pub use admin::{Admin, NewAdmin};
pub use module::{Module, NewModule, UpdateModule};
pub use order::{
    CartLine, Order, OrderFilter, OrderItem, OrderTotals, PaymentMode, PaymentStatus,
};
pub use product::{NewProduct, Product, UpdateProduct};
pub use session::{NewSession, Principal, Role, Session};
pub use user::{OtpChallenge, UpdateUser, User};
pub use vendor::{NearbyVendor, NewVendor, UpdateVendor, Vendor};
