//! DTOs for login, OTP and logout endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::PHONE_RE;

/// Email/password login for admins and vendors.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OtpSendRequest {
    #[validate(regex(path = "*PHONE_RE", message = "Invalid phone number"))]
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct OtpSendResponse {
    pub message: String,
    pub expires_in_seconds: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OtpVerifyRequest {
    #[validate(regex(path = "*PHONE_RE", message = "Invalid phone number"))]
    pub phone: String,

    #[validate(length(equal = 6, message = "Code must have 6 digits"))]
    pub code: String,
}

/// A bearer token together with the account it was issued for.
#[derive(Debug, Serialize)]
pub struct TokenResponse<T: Serialize> {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new_user: Option<bool>,
    pub account: T,
}

impl<T: Serialize> TokenResponse<T> {
    pub fn bearer(token: String, expires_at: DateTime<Utc>, account: T) -> Self {
        Self {
            token,
            token_type: "Bearer",
            expires_at,
            is_new_user: None,
            account,
        }
    }
}

/// Generic acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of the activate/deactivate endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub is_active: bool,
}
