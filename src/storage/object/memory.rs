use super::{ObjectStore, StoredObject};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

struct StoredBlob {
    bytes: Bytes,
    content_type: String,
}

/// Process-local object store. Used by tests and by `OBJECT_BACKEND=memory`.
pub struct MemoryObjectStore {
    base_url: String,
    objects: RwLock<BTreeMap<String, StoredBlob>>,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    /// Bytes and content type stored under `name`.
    pub async fn object(&self, name: &str) -> Option<(Bytes, String)> {
        self.objects
            .read()
            .await
            .get(name)
            .map(|b| (b.bytes.clone(), b.content_type.clone()))
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new("memory://uploads")
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, name: &str, bytes: Bytes, content_type: &str) -> Result<String> {
        self.objects.write().await.insert(
            name.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.url_for(name))
    }

    async fn list_objects(&self) -> Result<Vec<StoredObject>> {
        Ok(self
            .objects
            .read()
            .await
            .keys()
            .map(|name| StoredObject {
                name: name.clone(),
                url: self.url_for(name),
            })
            .collect())
    }

    async fn delete_object(&self, name: &str) -> Result<bool> {
        Ok(self.objects.write().await.remove(name).is_some())
    }
}
