//! Generic CRUD service for content entities.
//!
//! One `ResourceService` serves any `ContentModel`: it validates input
//! against the model's field specs, applies the publish-timestamp rule and
//! hands a single write to the injected `EntityStore`.

use crate::app::error::{AppError, AppResult};
use crate::domain::model::{ContentModel, Record, Status};
use crate::domain::{publish, validation};
use crate::storage::EntityStore;
use chrono::Utc;
use serde_json::Value as JsonValue;
use std::sync::Arc;

pub struct ResourceService {
    model: Arc<dyn ContentModel>,
    store: Arc<dyn EntityStore>,
}

impl ResourceService {
    pub fn new(model: Arc<dyn ContentModel>, store: Arc<dyn EntityStore>) -> Self {
        Self { model, store }
    }

    pub fn model(&self) -> &dyn ContentModel {
        self.model.as_ref()
    }

    /// All entities, newest first, optionally restricted to one status.
    pub async fn list(&self, status: Option<Status>) -> AppResult<Vec<Record>> {
        self.store
            .list(self.model(), status)
            .await
            .map_err(|e| self.storage_error("list", None, e))
    }

    /// `Ok(None)` when nothing is stored under `id`.
    pub async fn get(&self, id: i64) -> AppResult<Option<Record>> {
        self.store
            .get(self.model(), id)
            .await
            .map_err(|e| self.storage_error("get", Some(id), e))
    }

    pub async fn create(&self, payload: &JsonValue) -> AppResult<Record> {
        let mut new = validation::validate_create(self.model(), payload)?;
        if publish::stamp_on_create(&mut new, Utc::now()) {
            tracing::debug!(resource = self.model.resource_name(), "stamped publishedAt on create");
        }

        let record = self
            .store
            .insert(self.model(), &new)
            .await
            .map_err(|e| self.storage_error("create", None, e))?;
        tracing::info!(
            resource = self.model.resource_name(),
            id = record.id,
            status = %record.status,
            "created"
        );
        Ok(record)
    }

    /// Partial update. Validation runs first, then existence is checked, then
    /// only the supplied fields (plus `updatedAt`) are written.
    pub async fn update(&self, id: i64, payload: &JsonValue) -> AppResult<Record> {
        let mut changes = validation::validate_update(self.model(), payload)?;
        let existing = self.require(id, "update").await?;

        if publish::stamp_on_update(&mut changes, &existing, Utc::now()) {
            tracing::debug!(resource = self.model.resource_name(), id, "stamped publishedAt on update");
        }

        let updated = self
            .store
            .update(self.model(), id, &changes)
            .await
            .map_err(|e| self.storage_error("update", Some(id), e))?
            // Deleted between the existence check and the write.
            .ok_or_else(|| AppError::not_found(self.model.resource_name(), id))?;
        tracing::info!(resource = self.model.resource_name(), id, "updated");
        Ok(updated)
    }

    /// Hard delete. Returns whether a stored entity was actually removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        self.require(id, "delete").await?;
        let removed = self
            .store
            .delete(self.model(), id)
            .await
            .map_err(|e| self.storage_error("delete", Some(id), e))?;
        tracing::info!(resource = self.model.resource_name(), id, removed, "deleted");
        Ok(removed)
    }

    async fn require(&self, id: i64, operation: &'static str) -> AppResult<Record> {
        self.store
            .get(self.model(), id)
            .await
            .map_err(|e| self.storage_error(operation, Some(id), e))?
            .ok_or_else(|| AppError::not_found(self.model.resource_name(), id))
    }

    fn storage_error(&self, operation: &'static str, id: Option<i64>, err: anyhow::Error) -> AppError {
        tracing::error!(
            operation,
            resource = self.model.resource_name(),
            id = ?id,
            error = ?err,
            "entity store call failed"
        );
        AppError::Storage(err)
    }
}
