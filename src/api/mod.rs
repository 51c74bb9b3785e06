//! REST API under `/api`.
//!
//! Handlers stay thin: they validate DTOs, pull the [`Principal`] placed by
//! the role guards, call a service and map the result back to JSON.
//!
//! - [`dto`] - Request and response bodies
//! - [`handlers`] - Endpoint functions grouped by audience
//! - [`middleware`] - Bearer-token guards, rate limits, request tracing
//! - [`routes`] - Router assembly for the public, admin, vendor and user groups
//!
//! [`Principal`]: crate::domain::entities::Principal

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
