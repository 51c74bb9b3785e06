//! Back-office handlers under `/api/admin`.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::admin::{AdminListResponse, AdminResponse, CreateAdminRequest};
use crate::api::dto::auth::StatusRequest;
use crate::api::dto::catalog::{
    AdminUpdateVendorRequest, CreateModuleRequest, CreateVendorRequest, ModuleListResponse,
    ModuleResponse, ProductResponse, UpdateModuleRequest, VendorListParams, VendorResponse,
};
use crate::api::dto::pagination::{PaginatedResponse, PaginationParams};
use crate::api::dto::user::UserResponse;
use crate::domain::entities::{Principal, Role};
use crate::error::AppError;
use crate::state::AppState;

// ─── Admin accounts ─────────────────────────────────────────────────────────

/// `GET /api/admin/me`
pub async fn admin_me_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<AdminResponse>, AppError> {
    let admin = state.admin_service.get(principal.subject_id).await?;
    Ok(Json(admin.into()))
}

/// `GET /api/admin/admins`
pub async fn list_admins_handler(
    State(state): State<AppState>,
) -> Result<Json<AdminListResponse>, AppError> {
    let admins = state.admin_service.list_admins().await?;
    Ok(Json(AdminListResponse {
        items: admins.into_iter().map(Into::into).collect(),
    }))
}

/// Creates another admin account.
///
/// # Endpoint
///
/// `POST /api/admin/admins`
///
/// # Errors
///
/// - 403 unless the caller is a super admin
/// - 409 if the email is already registered
pub async fn create_admin_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<AdminResponse>), AppError> {
    payload.validate()?;

    let admin = state
        .admin_service
        .create_admin(principal.subject_id, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(admin.into())))
}

/// Activates or deactivates another admin.
///
/// # Endpoint
///
/// `PATCH /api/admin/admins/{id}/status`
///
/// Deactivation revokes every session of the target.
pub async fn set_admin_status_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<AdminResponse>, AppError> {
    let admin = state
        .admin_service
        .set_admin_active(principal.subject_id, id, payload.is_active)
        .await?;

    if !payload.is_active {
        state.auth_service.revoke_all(Role::Admin, id).await?;
    }

    Ok(Json(admin.into()))
}

// ─── Modules ────────────────────────────────────────────────────────────────

/// `GET /api/admin/modules` (active and inactive)
pub async fn list_modules_handler(
    State(state): State<AppState>,
) -> Result<Json<ModuleListResponse>, AppError> {
    let modules = state.catalog_service.list_modules(false).await?;
    Ok(Json(ModuleListResponse {
        items: modules.into_iter().map(Into::into).collect(),
    }))
}

/// `POST /api/admin/modules`
pub async fn create_module_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateModuleRequest>,
) -> Result<(StatusCode, Json<ModuleResponse>), AppError> {
    payload.validate()?;

    let module = state.catalog_service.create_module(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(module.into())))
}

/// `PATCH /api/admin/modules/{id}`
pub async fn update_module_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateModuleRequest>,
) -> Result<Json<ModuleResponse>, AppError> {
    payload.validate()?;

    let module = state
        .catalog_service
        .update_module(id, payload.into())
        .await?;
    Ok(Json(module.into()))
}

/// Deletes a module.
///
/// # Endpoint
///
/// `DELETE /api/admin/modules/{id}`
///
/// # Errors
///
/// Returns 409 while any vendor still belongs to the module.
pub async fn delete_module_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.catalog_service.delete_module(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Vendors ────────────────────────────────────────────────────────────────

/// `GET /api/admin/vendors?module_id=&page=&page_size=`
pub async fn list_vendors_handler(
    State(state): State<AppState>,
    Query(params): Query<VendorListParams>,
) -> Result<Json<PaginatedResponse<VendorResponse>>, AppError> {
    let page = params.pagination.to_page_request()?;
    let vendors = state
        .catalog_service
        .list_vendors(params.module_id, page)
        .await?;

    Ok(Json(PaginatedResponse::from_paged(vendors, page, Into::into)))
}

/// Onboards a vendor.
///
/// # Endpoint
///
/// `POST /api/admin/vendors`
///
/// # Errors
///
/// - 400 if validation fails or the module does not exist
/// - 409 if the email is already registered
pub async fn create_vendor_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateVendorRequest>,
) -> Result<(StatusCode, Json<VendorResponse>), AppError> {
    payload.validate()?;

    let vendor = state.catalog_service.create_vendor(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(vendor.into())))
}

/// `GET /api/admin/vendors/{id}`
pub async fn get_vendor_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<VendorResponse>, AppError> {
    let vendor = state.catalog_service.get_vendor(id).await?;
    Ok(Json(vendor.into()))
}

/// `PATCH /api/admin/vendors/{id}`
pub async fn update_vendor_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateVendorRequest>,
) -> Result<Json<VendorResponse>, AppError> {
    payload.validate()?;

    let vendor = state
        .catalog_service
        .update_vendor(id, payload.into())
        .await?;
    Ok(Json(vendor.into()))
}

/// Activates or deactivates a vendor.
///
/// # Endpoint
///
/// `PATCH /api/admin/vendors/{id}/status`
///
/// Deactivation hides the vendor from the storefront and revokes its sessions.
pub async fn set_vendor_status_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<VendorResponse>, AppError> {
    let vendor = state
        .catalog_service
        .set_vendor_active(id, payload.is_active)
        .await?;

    if !payload.is_active {
        state.auth_service.revoke_all(Role::Vendor, id).await?;
    }

    Ok(Json(vendor.into()))
}

/// `GET /api/admin/vendors/{id}/products`
///
/// All products of a vendor, including inactive ones.
pub async fn vendor_products_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<ProductResponse>>, AppError> {
    let page = params.to_page_request()?;
    state.catalog_service.get_vendor(id).await?;
    let products = state.catalog_service.list_products(id, false, page).await?;

    Ok(Json(PaginatedResponse::from_paged(products, page, Into::into)))
}

// ─── Users ──────────────────────────────────────────────────────────────────

/// `GET /api/admin/users`
pub async fn list_users_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<UserResponse>>, AppError> {
    let page = params.to_page_request()?;
    let users = state.user_service.list_users(page).await?;

    Ok(Json(PaginatedResponse::from_paged(users, page, Into::into)))
}

/// `PATCH /api/admin/users/{id}/status`
///
/// Deactivation revokes every session of the user.
pub async fn set_user_status_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .user_service
        .set_user_active(id, payload.is_active)
        .await?;

    if !payload.is_active {
        state.auth_service.revoke_all(Role::User, id).await?;
    }

    Ok(Json(user.into()))
}
