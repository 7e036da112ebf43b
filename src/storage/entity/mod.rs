use crate::domain::model::{ContentModel, NewRecord, Record, RecordChanges, Status};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::MemoryEntityStore;
pub use postgres::PgEntityStore;

/// Narrow contract the resource service uses to reach an entity store.
///
/// Implementations own id assignment and the `createdAt`/`updatedAt`
/// timestamps, and normalise whatever they store into `Record`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// All entities of `model`, optionally filtered by status, most recent first.
    async fn list(&self, model: &dyn ContentModel, status: Option<Status>) -> anyhow::Result<Vec<Record>>;

    async fn get(&self, model: &dyn ContentModel, id: i64) -> anyhow::Result<Option<Record>>;

    /// Persists a new entity and returns it with its assigned id and timestamps.
    async fn insert(&self, model: &dyn ContentModel, new: &NewRecord) -> anyhow::Result<Record>;

    /// Writes only the supplied changes plus a fresh `updatedAt`.
    /// Returns `None` if the id does not exist.
    async fn update(
        &self,
        model: &dyn ContentModel,
        id: i64,
        changes: &RecordChanges,
    ) -> anyhow::Result<Option<Record>>;

    /// Hard delete. Returns true if something was removed.
    async fn delete(&self, model: &dyn ContentModel, id: i64) -> anyhow::Result<bool>;

    /// Cheap reachability check used by the health endpoint.
    async fn ping(&self) -> anyhow::Result<()>;
}
