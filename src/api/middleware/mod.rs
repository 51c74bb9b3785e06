//! Request middleware: role guards, per-IP rate limits and tracing spans.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
