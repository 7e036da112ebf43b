use super::EntityStore;
use crate::domain::model::{ContentModel, NewRecord, Record, RecordChanges, Status};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Record>,
}

/// Process-local entity store. Used by tests and by `STORAGE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryEntityStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn list(&self, model: &dyn ContentModel, status: Option<Status>) -> Result<Vec<Record>> {
        let tables = self.tables.read().await;
        let mut records: Vec<Record> = tables
            .get(model.table_name())
            .map(|t| {
                t.rows
                    .values()
                    .filter(|r| status.map_or(true, |s| r.status == s))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn get(&self, model: &dyn ContentModel, id: i64) -> Result<Option<Record>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(model.table_name())
            .and_then(|t| t.rows.get(&id))
            .cloned())
    }

    async fn insert(&self, model: &dyn ContentModel, new: &NewRecord) -> Result<Record> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(model.table_name().to_string()).or_default();
        table.next_id += 1;

        let now = Utc::now();
        let record = Record {
            id: table.next_id,
            fields: new.fields.clone(),
            status: new.status,
            published_at: new.published_at,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        model: &dyn ContentModel,
        id: i64,
        changes: &RecordChanges,
    ) -> Result<Option<Record>> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables
            .get_mut(model.table_name())
            .and_then(|t| t.rows.get_mut(&id))
        else {
            return Ok(None);
        };
        changes.apply_to(record, Utc::now());
        Ok(Some(record.clone()))
    }

    async fn delete(&self, model: &dyn ContentModel, id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(model.table_name())
            .and_then(|t| t.rows.remove(&id))
            .is_some())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
