//! Image upload handler for admins and vendors.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde_json::json;

use crate::api::dto::upload::UploadResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Name of the multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// Stores an uploaded image and returns its public URL.
///
/// # Endpoint
///
/// `POST /api/{admin,vendor}/uploads` (`multipart/form-data`, field `file`)
///
/// # Response
///
/// ```json
/// { "url": "/uploads/5f0c9a7e3b1d4e2fa8c6b0d1e9f7a3c2.png" }
/// ```
///
/// # Errors
///
/// Returns 400 if the `file` field is missing, empty, too large, or not a
/// PNG, JPEG or WebP image.
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::bad_request("Invalid multipart body", json!({"reason": e.body_text()}))
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(|e| {
            AppError::bad_request("Failed to read upload", json!({"reason": e.body_text()}))
        })?;

        let url = state
            .upload_service
            .store(content_type.as_deref(), &bytes)
            .await?;

        return Ok((StatusCode::CREATED, Json(UploadResponse { url })));
    }

    Err(AppError::bad_request(
        "Missing file field",
        json!({"field": FILE_FIELD}),
    ))
}
