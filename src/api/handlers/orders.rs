//! Order listing, detail and status handlers shared by every role.
//!
//! The same handlers are mounted under `/api/admin`, `/api/vendor` and
//! `/api/user`; the [`Principal`] inserted by the auth middleware decides
//! what the caller can see and do.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::api::dto::order::{
    CancelRequest, OrderDetailResponse, OrderListParams, OrderResponse, StatusChangeRequest,
};
use crate::api::dto::pagination::PaginatedResponse;
use crate::domain::entities::Principal;
use crate::domain::order_status::OrderStatus;
use crate::error::AppError;
use crate::state::AppState;

/// Lists orders visible to the caller, newest first.
///
/// # Endpoint
///
/// `GET /api/{role}/orders?status=&vendor_id=&user_id=&page=&page_size=`
///
/// Users only ever see their own orders and vendors the orders placed with
/// them, whatever the filter says. Carts are never listed.
pub async fn list_orders_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<PaginatedResponse<OrderResponse>>, AppError> {
    let page = params.pagination.to_page_request()?;
    let orders = state
        .order_service
        .list_for(principal, params.filter(), page)
        .await?;

    Ok(Json(PaginatedResponse::from_paged(orders, page, Into::into)))
}

/// `GET /api/{role}/orders/{id}`
///
/// Orders outside the caller's scope are reported as not found.
pub async fn get_order_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetailResponse>, AppError> {
    let detail = state.order_service.get_for(principal, id).await?;
    Ok(Json(detail.into()))
}

/// Moves an order along its lifecycle.
///
/// # Endpoint
///
/// `POST /api/{admin,vendor}/orders/{id}/status`
///
/// # Request Body
///
/// ```json
/// { "status": "cancelled", "reason": "Out of stock" }
/// ```
///
/// # Errors
///
/// - 403 if the caller's role may not perform the transition
/// - 409 for an illegal transition or a refund of an unpaid order
pub async fn change_status_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusChangeRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    payload.validate()?;

    let order = state
        .order_service
        .transition(principal, id, payload.status, payload.reason)
        .await?;
    Ok(Json(order.into()))
}

/// Cancels one of the user's placed orders.
///
/// # Endpoint
///
/// `POST /api/user/orders/{id}/cancel`
pub async fn cancel_order_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    payload: Option<Json<CancelRequest>>,
) -> Result<Json<OrderResponse>, AppError> {
    let Json(payload) = payload.unwrap_or_default();
    payload.validate()?;

    let order = state
        .order_service
        .transition(principal, id, OrderStatus::Cancelled, payload.reason)
        .await?;
    Ok(Json(order.into()))
}
