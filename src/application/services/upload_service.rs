//! Image uploads for module, vendor and product pictures.

use serde_json::json;
use std::path::PathBuf;

use crate::error::AppError;
use crate::utils::token::generate_file_stem;

/// Public URL prefix under which stored files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Stores uploaded images on the local filesystem.
pub struct UploadService {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Writes an image under a random name and returns its public URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty file, a file above the
    /// size limit, an unsupported content type or content that does not match
    /// the declared type, and [`AppError::Internal`] if the file cannot be
    /// written.
    pub async fn store(
        &self,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        let extension = content_type.and_then(extension_for).ok_or_else(|| {
            AppError::bad_request(
                "Unsupported file type",
                json!({"allowed": ["image/png", "image/jpeg", "image/webp"]}),
            )
        })?;

        if bytes.is_empty() {
            return Err(AppError::bad_request("File is empty", json!({})));
        }

        if bytes.len() > self.max_bytes {
            return Err(AppError::bad_request(
                "File too large",
                json!({"max_bytes": self.max_bytes, "size": bytes.len()}),
            ));
        }

        let detected = sniff_image(bytes);
        if detected != content_type {
            tracing::warn!(
                declared = content_type.unwrap_or_default(),
                detected = detected.unwrap_or("unknown"),
                "Upload content does not match its type"
            );
            return Err(AppError::bad_request(
                "File content does not match its type",
                json!({"declared": content_type, "detected": detected}),
            ));
        }

        let name = format!("{}.{}", generate_file_stem(), extension);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| write_failed(&e))?;
        tokio::fs::write(self.dir.join(&name), bytes)
            .await
            .map_err(|e| write_failed(&e))?;

        tracing::info!(file = %name, size = bytes.len(), "Upload stored");
        Ok(format!("{UPLOADS_URL_PREFIX}/{name}"))
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Content type implied by the file signature, if it is a supported image.
fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

fn write_failed(e: &std::io::Error) -> AppError {
    tracing::error!(error = %e, "Failed to store upload");
    AppError::internal("Failed to store upload", json!({}))
}
