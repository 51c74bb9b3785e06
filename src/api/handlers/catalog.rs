//! Public storefront handlers: modules, nearby vendors and their products.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::api::dto::catalog::{
    ModuleListResponse, NEARBY_LIMIT, NearbyParams, NearbyVendorsResponse, ProductResponse,
    PublicVendorResponse,
};
use crate::api::dto::pagination::{PaginatedResponse, PaginationParams};
use crate::domain::repositories::NearbyQuery;
use crate::error::AppError;
use crate::state::AppState;

/// Lists active modules ordered by `sort_order`, then name.
///
/// # Endpoint
///
/// `GET /api/catalog/modules`
pub async fn public_modules_handler(
    State(state): State<AppState>,
) -> Result<Json<ModuleListResponse>, AppError> {
    let modules = state.catalog_service.list_modules(true).await?;

    Ok(Json(ModuleListResponse {
        items: modules.into_iter().map(Into::into).collect(),
    }))
}

/// Finds open vendors delivering to a location, nearest first.
///
/// # Endpoint
///
/// `GET /api/catalog/vendors?lat=12.97&lng=77.59&module_id=1&radius_km=5`
///
/// A vendor is included only when the point lies within its own
/// `delivery_radius_km` and, if given, within `radius_km`.
pub async fn nearby_vendors_handler(
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<NearbyVendorsResponse>, AppError> {
    params.validate()?;

    let vendors = state
        .catalog_service
        .nearby_vendors(NearbyQuery {
            latitude: params.lat,
            longitude: params.lng,
            module_id: params.module_id,
            radius_km: params.radius_km,
            limit: NEARBY_LIMIT,
        })
        .await?;

    Ok(Json(NearbyVendorsResponse {
        items: vendors.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /api/catalog/vendors/{id}`
///
/// Inactive vendors are reported as not found.
pub async fn public_vendor_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PublicVendorResponse>, AppError> {
    let vendor = state.catalog_service.get_public_vendor(id).await?;
    Ok(Json(vendor.into()))
}

/// `GET /api/catalog/vendors/{id}/products`
///
/// Active products of an active vendor, paginated. Out-of-stock products are
/// listed with `in_stock: false`.
pub async fn public_products_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<ProductResponse>>, AppError> {
    let page = params.to_page_request()?;
    let products = state.catalog_service.list_public_products(id, page).await?;

    Ok(Json(PaginatedResponse::from_paged(products, page, Into::into)))
}
