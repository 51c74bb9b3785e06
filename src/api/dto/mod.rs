//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation. Money fields are `Decimal` and travel as strings.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod health;
pub mod order;
pub mod pagination;
pub mod upload;
pub mod user;
