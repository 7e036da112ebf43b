use crate::app::resource_service::ResourceService;
use crate::app::upload_service::UploadService;
use crate::domain::model::{BlogModel, ProjectModel};
use crate::domain::validation::FieldError;
use crate::storage::{EntityStore, ObjectStore};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub blogs: Arc<ResourceService>,
    pub projects: Arc<ResourceService>,
    pub uploads: Arc<UploadService>,
    /// Pinged by the health endpoint.
    pub entity_store: Arc<dyn EntityStore>,
}

impl AppState {
    /// Wires the blog and project services to `entity_store` and uploads to `object_store`.
    pub fn new(entity_store: Arc<dyn EntityStore>, object_store: Arc<dyn ObjectStore>) -> Self {
        Self {
            blogs: Arc::new(ResourceService::new(Arc::new(BlogModel), entity_store.clone())),
            projects: Arc::new(ResourceService::new(Arc::new(ProjectModel), entity_store.clone())),
            uploads: Arc::new(UploadService::new(object_store)),
            entity_store,
        }
    }
}

/// Uniform response envelope.
///
/// Success: `{success: true, data, message?}`.
/// Failure: `{success: false, data: null, error, details?}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data,
            message: None,
            error: None,
            details: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: JsonValue::Null,
            message: None,
            error: Some(error.into()),
            details: None,
        }
    }

    /// Adds a human readable message to a success envelope.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        if self.success {
            self.message = Some(message.into());
        }
        self
    }

    /// Attaches field-level details to a failure envelope.
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        if !self.success {
            self.details = Some(details);
        }
        self
    }
}

/// Shorthand for the `(status, envelope)` pair every handler returns.
pub type ApiReply = (StatusCode, Json<ApiResponse>);

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    /// Restrict the listing to `draft` or `published` entities.
    pub status: Option<String>,
}
