//! PostgreSQL entity store.
//!
//! Rows are read back through `row_to_json(t.*)` so a single code path can
//! serve every `ContentModel`; column names come from the model's field specs
//! and the JSON is normalised into `Record` before leaving this module.

use super::EntityStore;
use crate::domain::model::{ContentModel, FieldKind, FieldSpec, NewRecord, Record, RecordChanges, Status};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};
use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::{PgPool, QueryBuilder, Row};
use std::sync::Arc;

/// Entity store backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("failed to connect to DATABASE_URL")?;
        Ok(Self::new(pool))
    }

    /// Creates the tables (and the listing index) for every model if missing.
    pub async fn ensure_schema(&self, models: &[Arc<dyn ContentModel>]) -> Result<()> {
        for model in models {
            sqlx::query(model.get_create_table_sql())
                .execute(&self.pool)
                .await
                .with_context(|| format!("failed to create table {}", model.table_name()))?;

            let index_sql = format!(
                "CREATE INDEX IF NOT EXISTS {table}_created_at_idx ON {table} (created_at DESC)",
                table = model.table_name()
            );
            sqlx::query(&index_sql).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Deletes every row of `model`. Used by integration tests.
    pub async fn truncate(&self, model: &dyn ContentModel) -> Result<()> {
        sqlx::query(&format!("TRUNCATE TABLE {} RESTART IDENTITY", model.table_name()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn list(&self, model: &dyn ContentModel, status: Option<Status>) -> Result<Vec<Record>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT row_to_json(t.*) AS record FROM {} t",
            model.table_name()
        ));
        if let Some(status) = status {
            qb.push(" WHERE t.status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY t.created_at DESC, t.id DESC");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| record_from_json(model, row.try_get("record")?))
            .collect()
    }

    async fn get(&self, model: &dyn ContentModel, id: i64) -> Result<Option<Record>> {
        let sql = format!(
            "SELECT row_to_json(t.*) AS record FROM {} t WHERE t.id = $1",
            model.table_name()
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| record_from_json(model, r.try_get("record")?))
            .transpose()
    }

    async fn insert(&self, model: &dyn ContentModel, new: &NewRecord) -> Result<Record> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("WITH written AS (INSERT INTO {} (", model.table_name()));
        {
            let mut cols = qb.separated(", ");
            for spec in model.fields() {
                cols.push(quote_ident(spec.column));
            }
            cols.push("status");
            cols.push("published_at");
        }
        qb.push(") VALUES (");
        {
            let mut vals = qb.separated(", ");
            for spec in model.fields() {
                let value = new.fields.get(spec.name).unwrap_or(&JsonValue::Null);
                push_field_value(&mut vals, spec, value);
            }
            vals.push_bind(new.status.as_str());
            vals.push_bind(new.published_at);
        }
        qb.push(") RETURNING *) SELECT row_to_json(written.*) AS record FROM written");

        let row = qb.build().fetch_one(&self.pool).await?;
        record_from_json(model, row.try_get("record")?)
    }

    async fn update(
        &self,
        model: &dyn ContentModel,
        id: i64,
        changes: &RecordChanges,
    ) -> Result<Option<Record>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("WITH written AS (UPDATE {} SET ", model.table_name()));
        {
            let mut sets = qb.separated(", ");
            for spec in model.fields() {
                if let Some(value) = changes.fields.get(spec.name) {
                    sets.push(format!("{} = ", quote_ident(spec.column)));
                    push_field_value_unseparated(&mut sets, spec, value);
                }
            }
            if let Some(status) = changes.status {
                sets.push("status = ");
                sets.push_bind_unseparated(status.as_str());
            }
            if let Some(published_at) = changes.published_at {
                sets.push("published_at = ");
                sets.push_bind_unseparated(published_at);
            }
            sets.push("updated_at = now()");
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING *) SELECT row_to_json(written.*) AS record FROM written");

        let row = qb.build().fetch_optional(&self.pool).await?;
        row.map(|r| record_from_json(model, r.try_get("record")?))
            .transpose()
    }

    async fn delete(&self, model: &dyn ContentModel, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", model.table_name());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident)
}

fn push_field_value(
    sep: &mut sqlx::query_builder::Separated<'_, '_, Postgres, &'static str>,
    spec: &FieldSpec,
    value: &JsonValue,
) {
    match spec.kind {
        FieldKind::Bool => sep.push_bind(value.as_bool()),
        FieldKind::Text { .. } | FieldKind::Url => sep.push_bind(value.as_str().map(str::to_string)),
    };
}

fn push_field_value_unseparated(
    sep: &mut sqlx::query_builder::Separated<'_, '_, Postgres, &'static str>,
    spec: &FieldSpec,
    value: &JsonValue,
) {
    match spec.kind {
        FieldKind::Bool => sep.push_bind_unseparated(value.as_bool()),
        FieldKind::Text { .. } | FieldKind::Url => {
            sep.push_bind_unseparated(value.as_str().map(str::to_string))
        }
    };
}

/// Normalises a `row_to_json` document into a `Record`.
fn record_from_json(model: &dyn ContentModel, row: JsonValue) -> Result<Record> {
    let obj = row
        .as_object()
        .ok_or_else(|| anyhow!("{}: row is not a JSON object", model.table_name()))?;

    let id = obj
        .get("id")
        .and_then(JsonValue::as_i64)
        .ok_or_else(|| anyhow!("{}: row without integer id", model.table_name()))?;
    let status = obj
        .get("status")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .parse::<Status>()
        .map_err(|e| anyhow!("{} {}: status {}", model.table_name(), id, e))?;

    let mut fields = Map::new();
    for spec in model.fields() {
        let value = obj.get(spec.column).cloned().unwrap_or(JsonValue::Null);
        fields.insert(spec.name.to_string(), value);
    }

    Ok(Record {
        id,
        fields,
        status,
        published_at: optional_timestamp(obj.get("published_at"))?,
        created_at: required_timestamp(obj.get("created_at"), "created_at")?,
        updated_at: required_timestamp(obj.get("updated_at"), "updated_at")?,
    })
}

fn optional_timestamp(value: Option<&JsonValue>) -> Result<Option<DateTime<Utc>>> {
    match value.and_then(JsonValue::as_str) {
        None => Ok(None),
        Some(s) => Ok(Some(
            DateTime::parse_from_rfc3339(s)
                .with_context(|| format!("invalid timestamp '{}'", s))?
                .with_timezone(&Utc),
        )),
    }
}

fn required_timestamp(value: Option<&JsonValue>, column: &str) -> Result<DateTime<Utc>> {
    optional_timestamp(value)?.ok_or_else(|| anyhow!("row without {}", column))
}
