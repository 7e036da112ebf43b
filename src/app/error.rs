//! Error taxonomy shared by the resource and upload services.

use crate::domain::validation::FieldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or constraint-violating input.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// The id (or object name) does not resolve to anything stored.
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: String },

    /// Input rejected before reaching a store, without per-field details.
    #[error("{0}")]
    BadRequest(String),

    /// The entity store or object store failed. Never shown to clients.
    #[error("storage failure: {0}")]
    Storage(#[source] anyhow::Error),

    /// Anything else that went wrong while serving a request.
    #[error("internal error: {0}")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        AppError::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }
}

impl From<Vec<FieldError>> for AppError {
    fn from(errors: Vec<FieldError>) -> Self {
        AppError::Validation(errors)
    }
}

pub type AppResult<T> = Result<T, AppError>;
