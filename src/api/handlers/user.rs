//! Customer profile and address book handlers under `/api/user`.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::user::{
    AddressListResponse, AddressResponse, CreateAddressRequest, UpdateAddressRequest,
    UpdateProfileRequest, UserResponse,
};
use crate::domain::entities::Principal;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/user/me`
pub async fn user_me_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.user_service.get(principal.subject_id).await?;
    Ok(Json(user.into()))
}

/// Updates name and email.
///
/// # Endpoint
///
/// `PATCH /api/user/me`
///
/// # Request Body
///
/// ```json
/// { "name": "Asha", "email": null }
/// ```
///
/// An absent field is left unchanged, `null` clears it.
pub async fn update_user_me_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.check()?;

    let user = state
        .user_service
        .update_profile(principal.subject_id, payload.into())
        .await?;
    Ok(Json(user.into()))
}

// ─── Addresses ──────────────────────────────────────────────────────────────

/// `GET /api/user/addresses` (default first)
pub async fn list_addresses_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<AddressListResponse>, AppError> {
    let addresses = state.address_service.list(principal.subject_id).await?;
    Ok(Json(AddressListResponse {
        items: addresses.into_iter().map(Into::into).collect(),
    }))
}

/// Adds an address. The first address always becomes the default.
///
/// # Endpoint
///
/// `POST /api/user/addresses`
pub async fn create_address_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<AddressResponse>), AppError> {
    payload.validate()?;

    let address = state
        .address_service
        .create(payload.into_new_address(principal.subject_id))
        .await?;
    Ok((StatusCode::CREATED, Json(address.into())))
}

/// `GET /api/user/addresses/{id}`
pub async fn get_address_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<AddressResponse>, AppError> {
    let address = state.address_service.get(principal.subject_id, id).await?;
    Ok(Json(address.into()))
}

/// `PATCH /api/user/addresses/{id}`
pub async fn update_address_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAddressRequest>,
) -> Result<Json<AddressResponse>, AppError> {
    payload.check()?;

    let address = state
        .address_service
        .update(principal.subject_id, id, payload.into())
        .await?;
    Ok(Json(address.into()))
}

/// Deletes an address.
///
/// # Endpoint
///
/// `DELETE /api/user/addresses/{id}`
///
/// Deleting the default promotes the most recent remaining address.
pub async fn delete_address_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.address_service.delete(principal.subject_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/user/addresses/{id}/default`
pub async fn set_default_address_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> Result<Json<AddressResponse>, AppError> {
    let address = state
        .address_service
        .set_default(principal.subject_id, id)
        .await?;
    Ok(Json(address.into()))
}
