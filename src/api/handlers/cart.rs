//! Cart, checkout and payment handlers under `/api/user`.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::cart::{
    AddItemRequest, CartListResponse, CartResponse, CheckoutBody, CheckoutResponse,
    SetQuantityRequest, VerifyPaymentRequest,
};
use crate::api::dto::order::OrderResponse;
use crate::domain::entities::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/user/carts`
///
/// Every non-empty cart of the user, one per vendor.
pub async fn list_carts_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<CartListResponse>, AppError> {
    let carts = state.cart_service.list_carts(principal.subject_id).await?;
    Ok(Json(CartListResponse {
        items: carts.into_iter().map(Into::into).collect(),
    }))
}

/// Returns the cart for a vendor with live prices.
///
/// # Endpoint
///
/// `GET /api/user/carts/{vendor_id}`
///
/// A vendor without a cart yields an empty cart priced at zero.
pub async fn get_cart_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(vendor_id): Path<i64>,
) -> Result<Json<CartResponse>, AppError> {
    let cart = state
        .cart_service
        .get_cart(principal.subject_id, vendor_id)
        .await?;
    Ok(Json(cart.into()))
}

/// `DELETE /api/user/carts/{vendor_id}`
pub async fn clear_cart_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(vendor_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .cart_service
        .clear(principal.subject_id, vendor_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adds units of a product to the vendor's cart.
///
/// # Endpoint
///
/// `POST /api/user/carts/{vendor_id}/items`
///
/// # Request Body
///
/// ```json
/// { "product_id": 12, "quantity": 2 }
/// ```
///
/// Adding a product already in the cart increases its quantity.
pub async fn add_item_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(vendor_id): Path<i64>,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, AppError> {
    payload.validate()?;

    let cart = state
        .cart_service
        .add_item(
            principal.subject_id,
            vendor_id,
            payload.product_id,
            payload.quantity,
        )
        .await?;
    Ok(Json(cart.into()))
}

/// `PATCH /api/user/carts/{vendor_id}/items/{product_id}`
///
/// A quantity of 0 removes the line.
pub async fn set_quantity_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((vendor_id, product_id)): Path<(i64, i64)>,
    Json(payload): Json<SetQuantityRequest>,
) -> Result<Json<CartResponse>, AppError> {
    payload.validate()?;

    let cart = state
        .cart_service
        .set_quantity(principal.subject_id, vendor_id, product_id, payload.quantity)
        .await?;
    Ok(Json(cart.into()))
}

/// `DELETE /api/user/carts/{vendor_id}/items/{product_id}`
pub async fn remove_item_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((vendor_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<CartResponse>, AppError> {
    let cart = state
        .cart_service
        .remove_item(principal.subject_id, vendor_id, product_id)
        .await?;
    Ok(Json(cart.into()))
}

/// Places the cart as an order.
///
/// # Endpoint
///
/// `POST /api/user/carts/{vendor_id}/checkout`
///
/// # Request Body
///
/// ```json
/// { "address_id": 4, "payment_mode": "cod", "note": "Ring twice" }
/// ```
///
/// # Response
///
/// - `cod`: the order is `placed` immediately
/// - `online`: the order waits for payment; `payment` carries what the
///   client needs to open the hosted checkout, then
///   `POST /api/user/orders/{id}/payment/verify` completes it
///
/// # Errors
///
/// - 400 for an empty cart, a closed vendor, unavailable products, an order
///   below the vendor minimum, or online payment when it is not configured
/// - 404 if the cart or the address does not exist
/// - 409 if the cart changed while it was being checked out
/// - 502 if the payment provider fails
pub async fn checkout_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(vendor_id): Path<i64>,
    Json(payload): Json<CheckoutBody>,
) -> Result<(StatusCode, Json<CheckoutResponse>), AppError> {
    payload.validate()?;

    let request = payload.into_request().map_err(|e| {
        AppError::bad_request("Invalid payment mode", json!({"reason": e}))
    })?;

    let outcome = state
        .cart_service
        .checkout(principal.subject_id, vendor_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Confirms an online payment reported by the client.
///
/// # Endpoint
///
/// `POST /api/user/orders/{id}/payment/verify`
///
/// The provider signature over `"{gateway_order_id}|{gateway_payment_id}"`
/// must verify against the gateway secret; the order then becomes `placed`
/// and `paid`.
pub async fn verify_payment_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(order_id): Path<i64>,
    Json(payload): Json<VerifyPaymentRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    payload.validate()?;

    let order = state
        .cart_service
        .verify_payment(
            principal.subject_id,
            order_id,
            payload.gateway_payment_id.trim(),
            payload.signature.trim(),
        )
        .await?;
    Ok(Json(order.into()))
}
