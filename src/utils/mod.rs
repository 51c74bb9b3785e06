//! Utility functions shared by services, handlers and the admin CLI.
//!
//! - [`order_number`] - Human-readable order numbers
//! - [`password`] - Argon2 password hashing
//! - [`token`] - Bearer tokens, OTP codes and keyed hashing
//! - [`validation`] - Phone, pincode and email rules

pub mod order_number;
pub mod password;
pub mod token;
pub mod validation;
