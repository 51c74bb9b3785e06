//! Top-level router combining the API, health check and uploaded files.
//!
//! # Route Structure
//!
//! - `GET  /health`      - Health check: database, payments (public)
//! - `GET  /uploads/*`   - Uploaded images (public)
//! - `/api/*`            - REST API, see [`crate::api::routes`]
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token buckets, strict on login and OTP endpoints
//! - **Authentication** - Bearer token with role guards per route group
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, tracing};
use crate::application::services::UPLOADS_URL_PREFIX;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let api_router = Router::new()
        .merge(api::routes::login_routes().layer(rate_limit::strict_layer(behind_proxy)))
        .merge(
            api::routes::protected_routes(state.clone()).layer(rate_limit::layer(behind_proxy)),
        );

    let uploads = ServeDir::new(state.upload_service.dir());

    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .nest_service(UPLOADS_URL_PREFIX, uploads)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
