//! CRUD handlers shared by every content resource (`/blogs`, `/projects`).
//!
//! Each resource is nested with its own `ResourceService` as router state.

use crate::app::error::AppError;
use crate::app::resource_service::ResourceService;
use crate::domain::validation;
use crate::transport::http::handlers::common::{
    method_not_allowed, query_error, reply, to_data, EntityId, JsonPayload,
};
use crate::transport::http::types::{ApiReply, ApiResponse, StatusQuery};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Routes for one resource, to be nested under its collection path.
pub fn resource_router<S>(service: Arc<ResourceService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            get(list_handler)
                .post(create_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/:id",
            get(get_handler)
                .put(update_handler)
                .delete(delete_handler)
                .fallback(method_not_allowed),
        )
        .with_state(service)
}

#[utoipa::path(
    get,
    path = "/{resource}",
    params(
        ("resource" = String, Path, description = "Collection name (blogs | projects)"),
        StatusQuery
    ),
    responses(
        (status = 200, description = "Entities, newest first", body = ApiResponse),
        (status = 400, description = "Invalid status filter", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn list_handler(
    State(service): State<Arc<ResourceService>>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<ApiReply, AppError> {
    let Query(query) = query.map_err(query_error)?;
    let status = validation::parse_status_filter(query.status.as_deref())?;
    let records = service.list(status).await?;
    Ok(reply(StatusCode::OK, ApiResponse::ok(to_data(&records)?)))
}

#[utoipa::path(
    get,
    path = "/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Collection name (blogs | projects)"),
        ("id" = i64, Path, description = "Entity id")
    ),
    responses(
        (status = 200, description = "Entity", body = ApiResponse),
        (status = 400, description = "Invalid id", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn get_handler(
    State(service): State<Arc<ResourceService>>,
    EntityId(id): EntityId,
) -> Result<ApiReply, AppError> {
    let record = service
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(service.model().resource_name(), id))?;
    Ok(reply(StatusCode::OK, ApiResponse::ok(to_data(&record)?)))
}

#[utoipa::path(
    post,
    path = "/{resource}",
    params(
        ("resource" = String, Path, description = "Collection name (blogs | projects)")
    ),
    request_body(content = Object, description = "Entity fields", content_type = "application/json"),
    responses(
        (status = 201, description = "Entity created", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn create_handler(
    State(service): State<Arc<ResourceService>>,
    JsonPayload(payload): JsonPayload,
) -> Result<ApiReply, AppError> {
    let record = service.create(&payload).await?;
    Ok(reply(
        StatusCode::CREATED,
        ApiResponse::ok(to_data(&record)?)
            .with_message(format!("{} created", service.model().resource_name())),
    ))
}

#[utoipa::path(
    put,
    path = "/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Collection name (blogs | projects)"),
        ("id" = i64, Path, description = "Entity id")
    ),
    request_body(content = Object, description = "Fields to change", content_type = "application/json"),
    responses(
        (status = 200, description = "Entity updated", body = ApiResponse),
        (status = 400, description = "Validation failed", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn update_handler(
    State(service): State<Arc<ResourceService>>,
    EntityId(id): EntityId,
    JsonPayload(payload): JsonPayload,
) -> Result<ApiReply, AppError> {
    let record = service.update(id, &payload).await?;
    Ok(reply(
        StatusCode::OK,
        ApiResponse::ok(to_data(&record)?)
            .with_message(format!("{} updated", service.model().resource_name())),
    ))
}

#[utoipa::path(
    delete,
    path = "/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Collection name (blogs | projects)"),
        ("id" = i64, Path, description = "Entity id")
    ),
    responses(
        (status = 200, description = "Entity deleted", body = ApiResponse),
        (status = 400, description = "Invalid id", body = ApiResponse),
        (status = 404, description = "Not found", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn delete_handler(
    State(service): State<Arc<ResourceService>>,
    EntityId(id): EntityId,
) -> Result<ApiReply, AppError> {
    let name = service.model().resource_name().to_string();
    if !service.delete(id).await? {
        return Err(AppError::not_found(name, id));
    }
    Ok(reply(
        StatusCode::OK,
        ApiResponse::ok(JsonValue::Null).with_message(format!("{} deleted", name)),
    ))
}
