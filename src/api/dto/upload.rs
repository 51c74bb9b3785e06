//! DTO for image uploads.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}
