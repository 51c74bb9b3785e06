//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and the third-party
//! services the marketplace talks to.
//!
//! # Modules
//!
//! - [`otp`] - One-time code delivery
//! - [`payment`] - Hosted payment gateway client (and a disabled fallback)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod otp;
pub mod payment;
pub mod persistence;
