use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod memory;
pub mod s3;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

/// An object as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredObject {
    pub name: String,
    pub url: String,
}

/// Blob storage contract used for image uploads.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `name` and returns the public URL of the object.
    async fn put_object(&self, name: &str, bytes: Bytes, content_type: &str) -> anyhow::Result<String>;

    async fn list_objects(&self) -> anyhow::Result<Vec<StoredObject>>;

    /// Returns false if no object with that name existed.
    async fn delete_object(&self, name: &str) -> anyhow::Result<bool>;
}
