use crate::app::error::AppError;
use crate::app::upload_service::{UploadService, UploadedImage};
use crate::transport::http::handlers::common::{reply, to_data, ObjectName};
use crate::transport::http::types::{ApiReply, ApiResponse, AppState};
use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use bytes::BytesMut;
use serde_json::Value as JsonValue;

/// Name of the multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Stores the `image` field of a multipart form (jpeg, png or webp, max 5 MiB).
#[utoipa::path(
    post,
    path = "/upload",
    responses(
        (status = 201, description = "Image stored", body = ApiResponse),
        (status = 400, description = "Missing field, unsupported type or file too large", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn upload_image_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiReply, AppError> {
    let uploads = state.uploads.as_ref();
    let mut multipart = multipart.map_err(|e| {
        AppError::BadRequest(format!("Expected a multipart/form-data body: {}", e.body_text()))
    })?;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(uploads, e))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        // Reject the type before reading the body.
        uploads.check_content_type(content_type.as_deref())?;

        let mut buf = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(uploads, e))? {
            if buf.len() + chunk.len() > uploads.max_bytes() {
                return Err(uploads.too_large());
            }
            buf.extend_from_slice(&chunk);
        }

        let uploaded: UploadedImage = uploads.upload(content_type.as_deref(), buf.freeze()).await?;
        return Ok(reply(
            StatusCode::CREATED,
            ApiResponse::ok(to_data(&uploaded)?).with_message("Image uploaded"),
        ));
    }

    Err(AppError::BadRequest(format!(
        "Missing '{}' file field",
        IMAGE_FIELD
    )))
}

#[utoipa::path(
    get,
    path = "/upload",
    responses(
        (status = 200, description = "Stored images", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn list_uploads_handler(State(state): State<AppState>) -> Result<ApiReply, AppError> {
    let objects = state.uploads.list().await?;
    Ok(reply(StatusCode::OK, ApiResponse::ok(to_data(&objects)?)))
}

#[utoipa::path(
    delete,
    path = "/upload/{filename}",
    params(
        ("filename" = String, Path, description = "Stored object name returned by the upload")
    ),
    responses(
        (status = 200, description = "Image deleted", body = ApiResponse),
        (status = 400, description = "Invalid filename", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn delete_upload_handler(
    State(state): State<AppState>,
    ObjectName(filename): ObjectName,
) -> Result<ApiReply, AppError> {
    state.uploads.delete(&filename).await?;
    Ok(reply(
        StatusCode::OK,
        ApiResponse::ok(JsonValue::Null).with_message("Image deleted"),
    ))
}

fn multipart_error(uploads: &UploadService, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return uploads.too_large();
    }
    AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
}
