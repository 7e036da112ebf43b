//! Mapping of service errors (and panics) onto the failure envelope.

use crate::app::error::AppError;
use crate::transport::http::handlers::common::json_body_error;
use crate::transport::http::types::{ApiReply, ApiResponse};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::any::Any;

const INTERNAL_ERROR: &str = "Internal server error";

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_reply(self) -> ApiReply {
        let status = self.status_code();
        let body = match self {
            AppError::Validation(details) => ApiResponse::failure("Validation failed").with_details(details),
            // Storage errors were logged with full context where they happened.
            AppError::Storage(_) => ApiResponse::failure(INTERNAL_ERROR),
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "unhandled error");
                ApiResponse::failure(INTERNAL_ERROR)
            }
            other => ApiResponse::failure(other.to_string()),
        };
        (status, Json(body))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        json_body_error(rejection)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_reply().into_response()
    }
}

/// `CatchPanicLayer` handler: a panicking handler still answers with the envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = detail, "handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::failure(INTERNAL_ERROR)),
    )
        .into_response()
}
