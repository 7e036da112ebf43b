use crate::app::error::AppError;
use crate::domain::validation::{self, FieldError};
use crate::transport::http::types::{ApiReply, ApiResponse};
use axum::async_trait;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, OriginalUri, Path};
use axum::http::request::Parts;
use axum::http::{Method, StatusCode, Uri};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// JSON request body. Rejections become a validation error on `body`.
#[derive(Deserialize, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonPayload(pub JsonValue);

/// `:id` path segment, parsed as a positive entity id.
pub struct EntityId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| path_error("id", e))?;
        Ok(EntityId(validation::parse_id(&raw)?))
    }
}

/// `:filename` path segment of a stored object.
pub struct ObjectName(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ObjectName
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(name) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| path_error("filename", e))?;
        Ok(ObjectName(name))
    }
}

/// Malformed or missing JSON body. Reported like any other validation failure.
pub fn json_body_error(rejection: JsonRejection) -> AppError {
    AppError::Validation(vec![FieldError::new("body", rejection.body_text())])
}

pub fn query_error(rejection: QueryRejection) -> AppError {
    AppError::Validation(vec![FieldError::new("query", rejection.body_text())])
}

fn path_error(field: &str, rejection: PathRejection) -> AppError {
    AppError::Validation(vec![FieldError::new(field, rejection.body_text())])
}

/// Serialises a payload for the `data` slot of the envelope.
pub fn to_data<T: Serialize>(value: &T) -> Result<JsonValue, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
}

pub fn reply(status: StatusCode, body: ApiResponse) -> ApiReply {
    (status, Json(body))
}

pub async fn fallback_handler(method: Method, uri: Uri) -> ApiReply {
    reply(
        StatusCode::NOT_FOUND,
        ApiResponse::failure(format!("Route {} {} not found", method, uri.path())),
    )
}

/// Method fallback of every route: the path exists but not for this method.
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> ApiReply {
    reply(
        StatusCode::METHOD_NOT_ALLOWED,
        ApiResponse::failure(format!("Method {} not allowed on {}", method, uri.path())),
    )
}
