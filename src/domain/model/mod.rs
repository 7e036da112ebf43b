//! Domain model definitions for content entities (blogs, projects).

pub mod blog;
pub mod project;
pub mod record;

pub use blog::BlogModel;
pub use project::ProjectModel;
pub use record::{NewRecord, Record, RecordChanges, Status};

use std::sync::Arc;

/// Every entity type served by the API.
pub fn content_models() -> Vec<Arc<dyn ContentModel>> {
    vec![Arc::new(BlogModel), Arc::new(ProjectModel)]
}

/// How a content field is checked and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text. `trim` strips surrounding whitespace before storing.
    Text { max_chars: Option<usize>, trim: bool },
    /// Absolute URL with a host. Empty strings are stored as null.
    Url,
    Bool,
}

/// Descriptor of one content field of an entity.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// camelCase name used on the wire.
    pub name: &'static str,
    /// snake_case column name used by relational stores.
    pub column: &'static str,
    pub kind: FieldKind,
    /// Must be present and non-empty on create.
    pub required: bool,
}

impl FieldSpec {
    pub const fn text(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Text {
                max_chars: None,
                trim: false,
            },
            required: false,
        }
    }

    pub const fn url(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Url,
            required: false,
        }
    }

    pub const fn boolean(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            kind: FieldKind::Bool,
            required: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn trimmed(mut self, max_chars: usize) -> Self {
        self.kind = FieldKind::Text {
            max_chars: Some(max_chars),
            trim: true,
        };
        self
    }

    /// Value written on create when the payload omits an optional field.
    pub fn default_value(&self) -> serde_json::Value {
        match self.kind {
            FieldKind::Bool => serde_json::Value::Bool(false),
            _ => serde_json::Value::Null,
        }
    }
}

/// Contract for an entity type served by the generic resource service.
///
/// Implementations describe the entity's content fields and storage layout;
/// the lifecycle fields (`id`, `status`, `publishedAt`, `createdAt`,
/// `updatedAt`) are shared by every entity and are not listed in `fields`.
pub trait ContentModel: Send + Sync {
    /// Human readable singular name, used in messages ("Blog").
    fn resource_name(&self) -> &str;

    /// Name of the table / collection holding this entity.
    fn table_name(&self) -> &str;

    /// Content fields in declaration order.
    fn fields(&self) -> &[FieldSpec];

    /// Returns the SQL CREATE TABLE statement for this model.
    fn get_create_table_sql(&self) -> &str;

    fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }
}
