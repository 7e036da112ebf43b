//! Image upload pass-through to object storage.

use crate::app::error::{AppError, AppResult};
use crate::storage::{ObjectStore, StoredObject};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Largest accepted image, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const MAX_FILENAME_CHARS: usize = 255;

/// Response payload of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadedImage {
    pub filename: String,
    pub url: String,
}

pub struct UploadService {
    store: Arc<dyn ObjectStore>,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Error returned as soon as an upload grows past `max_bytes`.
    pub fn too_large(&self) -> AppError {
        AppError::BadRequest(format!(
            "File too large: maximum size is {} MiB",
            self.max_bytes / (1024 * 1024)
        ))
    }

    /// Checks the declared content type and returns the extension to store it under.
    pub fn check_content_type(&self, content_type: Option<&str>) -> AppResult<&'static str> {
        content_type
            .and_then(image_extension)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Unsupported file type '{}': allowed types are image/jpeg, image/png, image/webp",
                    content_type.unwrap_or("unknown")
                ))
            })
    }

    /// Validates and stores one image under a freshly generated name.
    pub async fn upload(&self, content_type: Option<&str>, bytes: Bytes) -> AppResult<UploadedImage> {
        let extension = self.check_content_type(content_type)?;
        if bytes.len() > self.max_bytes {
            return Err(self.too_large());
        }
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        // check_content_type only succeeds with Some.
        let content_type = content_type.unwrap_or_default();

        let filename = generate_object_name(extension, Utc::now());
        let size = bytes.len();
        let url = self
            .store
            .put_object(&filename, bytes, content_type)
            .await
            .map_err(|e| storage_error("put_object", &filename, e))?;
        tracing::info!(filename = %filename, size, content_type, "image uploaded");
        Ok(UploadedImage { filename, url })
    }

    pub async fn list(&self) -> AppResult<Vec<StoredObject>> {
        self.store
            .list_objects()
            .await
            .map_err(|e| storage_error("list_objects", "*", e))
    }

    pub async fn delete(&self, filename: &str) -> AppResult<()> {
        validate_filename(filename)?;
        let removed = self
            .store
            .delete_object(filename)
            .await
            .map_err(|e| storage_error("delete_object", filename, e))?;
        if !removed {
            return Err(AppError::not_found("Image", filename));
        }
        tracing::info!(filename, "image deleted");
        Ok(())
    }
}

/// Maps an accepted image content type to its file extension.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// `<unix-millis>-<8 hex chars>.<ext>`, unique enough to avoid collisions.
pub fn generate_object_name(extension: &str, now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen();
    format!("{}-{:08x}.{}", now.timestamp_millis(), suffix, extension)
}

/// Rejects names that could escape the bucket prefix or are otherwise unusable as keys.
pub fn validate_filename(filename: &str) -> AppResult<()> {
    let invalid = filename.trim().is_empty()
        || filename.chars().count() > MAX_FILENAME_CHARS
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..");
    if invalid {
        return Err(AppError::BadRequest(format!("Invalid filename '{}'", filename)));
    }
    Ok(())
}

fn storage_error(operation: &'static str, name: &str, err: anyhow::Error) -> AppError {
    tracing::error!(operation, object = name, error = ?err, "object store call failed");
    AppError::Storage(err)
}
