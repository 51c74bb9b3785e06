//! Vendor self-service handlers under `/api/vendor`.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::catalog::{
    CreateProductRequest, ProductResponse, StockRequest, UpdateProductRequest,
    UpdateVendorRequest, VendorOpenRequest, VendorResponse,
};
use crate::api::dto::pagination::{PaginatedResponse, PaginationParams};
use crate::domain::entities::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/vendor/me`
pub async fn vendor_me_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<VendorResponse>, AppError> {
    let vendor = state.catalog_service.get_vendor(principal.subject_id).await?;
    Ok(Json(vendor.into()))
}

/// Updates the vendor's own profile and charges.
///
/// # Endpoint
///
/// `PATCH /api/vendor/me`
///
/// Module and activation are admin-controlled and cannot be changed here.
pub async fn update_vendor_me_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<UpdateVendorRequest>,
) -> Result<Json<VendorResponse>, AppError> {
    payload.validate()?;

    let vendor = state
        .catalog_service
        .update_vendor(principal.subject_id, payload.into())
        .await?;
    Ok(Json(vendor.into()))
}

/// Opens or closes the store for new orders.
///
/// # Endpoint
///
/// `PATCH /api/vendor/me/open`
pub async fn set_open_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<VendorOpenRequest>,
) -> Result<Json<VendorResponse>, AppError> {
    let vendor = state
        .catalog_service
        .set_vendor_open(principal.subject_id, payload.is_open)
        .await?;

    tracing::info!(vendor_id = vendor.id, is_open = vendor.is_open, "Vendor availability changed");
    Ok(Json(vendor.into()))
}

/// `GET /api/vendor/products`
pub async fn list_products_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<ProductResponse>>, AppError> {
    let page = params.to_page_request()?;
    let products = state
        .catalog_service
        .list_products(principal.subject_id, false, page)
        .await?;

    Ok(Json(PaginatedResponse::from_paged(products, page, Into::into)))
}

/// Creates a product owned by the calling vendor.
///
/// # Endpoint
///
/// `POST /api/vendor/products`
///
/// # Errors
///
/// Returns 400 if a price is negative or `selling_price` exceeds `price`.
pub async fn create_product_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    payload.validate()?;

    let product = state
        .catalog_service
        .create_product(payload.into_new_product(principal.subject_id))
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `GET /api/vendor/products/{id}`
pub async fn get_product_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .catalog_service
        .get_own_product(principal.subject_id, id)
        .await?;
    Ok(Json(product.into()))
}

/// `PATCH /api/vendor/products/{id}`
///
/// Products of other vendors are reported as not found.
pub async fn update_product_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    payload.validate()?;

    let product = state
        .catalog_service
        .update_product(principal.subject_id, id, payload.into())
        .await?;
    Ok(Json(product.into()))
}

/// `PATCH /api/vendor/products/{id}/stock`
pub async fn set_stock_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(payload): Json<StockRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .catalog_service
        .set_product_stock(principal.subject_id, id, payload.in_stock)
        .await?;
    Ok(Json(product.into()))
}

/// `DELETE /api/vendor/products/{id}`
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state
        .catalog_service
        .delete_product(principal.subject_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
