use crate::app::resource_service::ResourceService;
use crate::app::upload_service::{UploadedImage, MAX_IMAGE_BYTES};
use crate::domain::model::content_models;
use crate::domain::validation::FieldError;
use crate::storage::StoredObject;
use crate::transport::http::error::panic_response;
use crate::transport::http::handlers::common::{fallback_handler, method_not_allowed};
use crate::transport::http::handlers::{health, resources, uploads};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::path::PathItem;
use utoipa::{Modify, OpenApi};

/// Body limit on the upload route. Larger than the image limit so oversized
/// files reach the handler and get the size error instead of a bare 413.
const UPLOAD_BODY_LIMIT: usize = 4 * MAX_IMAGE_BYTES;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        resources::list_handler,
        resources::get_handler,
        resources::create_handler,
        resources::update_handler,
        resources::delete_handler,
        uploads::upload_image_handler,
        uploads::list_uploads_handler,
        uploads::delete_upload_handler
    ),
    components(schemas(ApiResponse, FieldError, UploadedImage, StoredObject)),
    modifiers(&CollectionPaths)
)]
pub struct ApiDoc;

/// Path prefix shared by the resource handlers' annotations.
const RESOURCE_TEMPLATE: &str = "/{resource}";

/// Expands the `/{resource}` handler docs into one concrete path per collection.
struct CollectionPaths;

impl Modify for CollectionPaths {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let templated: Vec<(String, PathItem)> = openapi
            .paths
            .paths
            .iter()
            .filter(|(path, _)| path.starts_with(RESOURCE_TEMPLATE))
            .map(|(path, item)| (path.clone(), item.clone()))
            .collect();

        for (path, item) in templated {
            openapi.paths.paths.remove(&path);
            for model in content_models() {
                let collection = model.table_name();
                let mut item = item.clone();
                for operation in item.operations.values_mut() {
                    if let Some(params) = operation.parameters.as_mut() {
                        params.retain(|p| p.name != "resource");
                    }
                    operation.tags = Some(vec![collection.to_string()]);
                    operation.operation_id = operation
                        .operation_id
                        .take()
                        .map(|id| format!("{}_{}", collection, id));
                }
                let concrete = path.replacen(RESOURCE_TEMPLATE, &format!("/{}", collection), 1);
                openapi.paths.paths.insert(concrete, item);
            }
        }
    }
}

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(health::healthcheck_handler).fallback(method_not_allowed),
        )
        .route(
            "/upload",
            post(uploads::upload_image_handler)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                .get(uploads::list_uploads_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/upload/:filename",
            delete(uploads::delete_upload_handler).fallback(method_not_allowed),
        )
        .nest(
            &collection_path(&app_state.blogs),
            resources::resource_router(app_state.blogs.clone()),
        )
        .nest(
            &collection_path(&app_state.projects),
            resources::resource_router(app_state.projects.clone()),
        )
        .fallback(fallback_handler)
        .with_state(app_state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Collections are mounted under their table name (`/blogs`, `/projects`).
fn collection_path(service: &ResourceService) -> String {
    format!("/{}", service.model().table_name())
}
