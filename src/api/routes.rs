//! API route configuration.
//!
//! Route groups are split by audience. Everything under `/admin`, `/vendor`
//! and `/user` (except the login endpoints) goes through the matching
//! [`crate::api::middleware::auth`] guard.

use axum::extract::DefaultBodyLimit;
use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::api::handlers::{admin, auth, cart, catalog, orders, upload, user, vendor};
use crate::api::middleware::auth as guard;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Credential endpoints, rate limited more strictly by the caller.
///
/// - `POST /auth/otp/send`
/// - `POST /auth/otp/verify`
/// - `POST /admin/login`
/// - `POST /vendor/login`
pub fn login_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/otp/send", post(auth::otp_send_handler))
        .route("/auth/otp/verify", post(auth::otp_verify_handler))
        .route("/admin/login", post(auth::admin_login_handler))
        .route("/vendor/login", post(auth::vendor_login_handler))
}

/// Public storefront.
///
/// - `GET /catalog/modules`
/// - `GET /catalog/vendors?lat&lng&module_id&radius_km`
/// - `GET /catalog/vendors/{id}`
/// - `GET /catalog/vendors/{id}/products`
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog/modules", get(catalog::public_modules_handler))
        .route("/catalog/vendors", get(catalog::nearby_vendors_handler))
        .route("/catalog/vendors/{id}", get(catalog::public_vendor_handler))
        .route(
            "/catalog/vendors/{id}/products",
            get(catalog::public_products_handler),
        )
}

fn upload_route(state: &AppState) -> Router<AppState> {
    let limit = state.upload_service.max_bytes() + MULTIPART_OVERHEAD;

    Router::new().route(
        "/uploads",
        post(upload::upload_handler)
            .layer::<_, std::convert::Infallible>(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(limit)),
    )
}

/// Back office, admin sessions only.
pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(admin::admin_me_handler))
        .route("/logout", post(auth::logout_handler))
        .route(
            "/admins",
            get(admin::list_admins_handler).post(admin::create_admin_handler),
        )
        .route("/admins/{id}/status", patch(admin::set_admin_status_handler))
        .route(
            "/modules",
            get(admin::list_modules_handler).post(admin::create_module_handler),
        )
        .route(
            "/modules/{id}",
            patch(admin::update_module_handler).delete(admin::delete_module_handler),
        )
        .route(
            "/vendors",
            get(admin::list_vendors_handler).post(admin::create_vendor_handler),
        )
        .route(
            "/vendors/{id}",
            get(admin::get_vendor_handler).patch(admin::update_vendor_handler),
        )
        .route(
            "/vendors/{id}/status",
            patch(admin::set_vendor_status_handler),
        )
        .route(
            "/vendors/{id}/products",
            get(admin::vendor_products_handler),
        )
        .route("/users", get(admin::list_users_handler))
        .route("/users/{id}/status", patch(admin::set_user_status_handler))
        .route("/orders", get(orders::list_orders_handler))
        .route("/orders/{id}", get(orders::get_order_handler))
        .route("/orders/{id}/status", post(orders::change_status_handler))
        .merge(upload_route(&state))
        .route_layer(middleware::from_fn_with_state(state, guard::admin))
}

/// Vendor self-service, vendor sessions only.
pub fn vendor_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            get(vendor::vendor_me_handler).patch(vendor::update_vendor_me_handler),
        )
        .route("/me/open", patch(vendor::set_open_handler))
        .route("/logout", post(auth::logout_handler))
        .route(
            "/products",
            get(vendor::list_products_handler).post(vendor::create_product_handler),
        )
        .route(
            "/products/{id}",
            get(vendor::get_product_handler)
                .patch(vendor::update_product_handler)
                .delete(vendor::delete_product_handler),
        )
        .route("/products/{id}/stock", patch(vendor::set_stock_handler))
        .route("/orders", get(orders::list_orders_handler))
        .route("/orders/{id}", get(orders::get_order_handler))
        .route("/orders/{id}/status", post(orders::change_status_handler))
        .merge(upload_route(&state))
        .route_layer(middleware::from_fn_with_state(state, guard::vendor))
}

/// Customer endpoints, user sessions only.
pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            get(user::user_me_handler).patch(user::update_user_me_handler),
        )
        .route("/logout", post(auth::logout_handler))
        .route(
            "/addresses",
            get(user::list_addresses_handler).post(user::create_address_handler),
        )
        .route(
            "/addresses/{id}",
            get(user::get_address_handler)
                .patch(user::update_address_handler)
                .delete(user::delete_address_handler),
        )
        .route(
            "/addresses/{id}/default",
            post(user::set_default_address_handler),
        )
        .route("/carts", get(cart::list_carts_handler))
        .route(
            "/carts/{vendor_id}",
            get(cart::get_cart_handler).delete(cart::clear_cart_handler),
        )
        .route("/carts/{vendor_id}/items", post(cart::add_item_handler))
        .route(
            "/carts/{vendor_id}/items/{product_id}",
            patch(cart::set_quantity_handler).delete(cart::remove_item_handler),
        )
        .route("/carts/{vendor_id}/checkout", post(cart::checkout_handler))
        .route("/orders", get(orders::list_orders_handler))
        .route("/orders/{id}", get(orders::get_order_handler))
        .route("/orders/{id}/cancel", post(orders::cancel_order_handler))
        .route(
            "/orders/{id}/payment/verify",
            post(cart::verify_payment_handler),
        )
        .route_layer(middleware::from_fn_with_state(state, guard::user))
}

/// Everything except [`login_routes`]: storefront plus the three guarded groups.
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/admin", admin_routes(state.clone()))
        .nest("/vendor", vendor_routes(state.clone()))
        .nest("/user", user_routes(state))
}

/// The whole API without rate limiting, as mounted under `/api`.
pub fn router(state: AppState) -> Router<AppState> {
    login_routes().merge(protected_routes(state))
}
