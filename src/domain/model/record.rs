use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;

/// Publication state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,
    Published,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::Draft, Status::Published];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Published => "published",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Status::Draft),
            "published" => Ok(Status::Published),
            other => Err(format!("must be one of: draft, published (got '{}')", other)),
        }
    }
}

/// A persisted entity, normalised at the adapter boundary.
///
/// `fields` holds the entity-specific content fields keyed by their camelCase
/// wire name; the lifecycle fields are shared by every entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, JsonValue>,
    pub status: Status,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub fn is_published(&self) -> bool {
        self.status == Status::Published
    }
}

/// Validated fields of an entity that does not exist yet.
///
/// The store assigns `id`, `createdAt` and `updatedAt`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub fields: Map<String, JsonValue>,
    pub status: Status,
    pub published_at: Option<DateTime<Utc>>,
}

/// Partial update. Only keys present here are written; `updatedAt` is always refreshed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordChanges {
    pub fields: Map<String, JsonValue>,
    pub status: Option<Status>,
    /// `None`: not supplied. `Some(None)`: explicitly cleared.
    pub published_at: Option<Option<DateTime<Utc>>>,
}

impl RecordChanges {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.status.is_none() && self.published_at.is_none()
    }

    /// Applies these changes to an existing record in place.
    ///
    /// Used by stores that keep whole records (the in-memory store); relational
    /// stores translate the changes into a single UPDATE instead.
    pub fn apply_to(&self, record: &mut Record, updated_at: DateTime<Utc>) {
        for (k, v) in &self.fields {
            record.fields.insert(k.clone(), v.clone());
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(published_at) = self.published_at {
            record.published_at = published_at;
        }
        record.updated_at = updated_at;
    }
}
