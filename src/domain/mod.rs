//! Domain layer containing business entities and rules.
//!
//! Nothing here depends on HTTP or SQL. The two pieces of real business logic
//! live in their own modules:
//!
//! - [`pricing`] - Cart pricing (subtotal, discount, charges, payable)
//! - [`order_status`] - Order lifecycle state machine and who may drive it
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`page`] - Offset pagination primitives

pub mod entities;
pub mod order_status;
pub mod page;
pub mod pricing;
pub mod repositories;
