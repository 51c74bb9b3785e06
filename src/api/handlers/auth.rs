//! Login, OTP and logout handlers.

use axum::{Extension, Json, extract::State};
use validator::Validate;

use crate::api::dto::admin::AdminResponse;
use crate::api::dto::auth::{
    LoginRequest, MessageResponse, OtpSendRequest, OtpSendResponse, OtpVerifyRequest,
    TokenResponse,
};
use crate::api::dto::catalog::VendorResponse;
use crate::api::dto::user::UserResponse;
use crate::api::middleware::auth::SessionToken;
use crate::domain::entities::Role;
use crate::error::AppError;
use crate::state::AppState;

/// Sends a one-time login code to a phone number.
///
/// # Endpoint
///
/// `POST /api/auth/otp/send`
///
/// # Errors
///
/// - 400 for a malformed phone number
/// - 429 when a code was sent to this phone less than `OTP_RESEND_SECONDS` ago
/// - 502 when the code could not be delivered
pub async fn otp_send_handler(
    State(state): State<AppState>,
    Json(payload): Json<OtpSendRequest>,
) -> Result<Json<OtpSendResponse>, AppError> {
    payload.validate()?;

    let expires_in_seconds = state.user_service.send_otp(payload.phone.trim()).await?;

    Ok(Json(OtpSendResponse {
        message: "OTP sent".to_string(),
        expires_in_seconds,
    }))
}

/// Verifies a login code and returns a user session.
///
/// # Endpoint
///
/// `POST /api/auth/otp/verify`
///
/// The user account is created on first successful login; `is_new_user`
/// tells the client to collect profile details.
pub async fn otp_verify_handler(
    State(state): State<AppState>,
    Json(payload): Json<OtpVerifyRequest>,
) -> Result<Json<TokenResponse<UserResponse>>, AppError> {
    payload.validate()?;

    let login = state
        .user_service
        .verify_otp(payload.phone.trim(), payload.code.trim())
        .await?;
    let issued = state.auth_service.issue(Role::User, login.user.id).await?;

    let mut response = TokenResponse::bearer(issued.token, issued.expires_at, login.user.into());
    response.is_new_user = Some(login.is_new_user);
    Ok(Json(response))
}

/// `POST /api/admin/login`
pub async fn admin_login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse<AdminResponse>>, AppError> {
    payload.validate()?;

    let admin = state
        .admin_service
        .login(&payload.email, &payload.password)
        .await?;
    let issued = state.auth_service.issue(Role::Admin, admin.id).await?;

    tracing::info!(admin_id = admin.id, "Admin logged in");
    Ok(Json(TokenResponse::bearer(
        issued.token,
        issued.expires_at,
        admin.into(),
    )))
}

/// `POST /api/vendor/login`
pub async fn vendor_login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse<VendorResponse>>, AppError> {
    payload.validate()?;

    let vendor = state
        .catalog_service
        .vendor_login(&payload.email, &payload.password)
        .await?;
    let issued = state.auth_service.issue(Role::Vendor, vendor.id).await?;

    tracing::info!(vendor_id = vendor.id, "Vendor logged in");
    Ok(Json(TokenResponse::bearer(
        issued.token,
        issued.expires_at,
        vendor.into(),
    )))
}

/// Revokes the session used for this request.
///
/// # Endpoint
///
/// `POST /api/{admin,vendor,user}/logout`
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth_service.revoke(&token).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}
