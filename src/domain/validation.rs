//! Input schemas for create / update / status-query / id-param.
//!
//! Every check runs to completion so a single failure lists all offending
//! fields at once.

use crate::domain::model::{ContentModel, FieldKind, FieldSpec, NewRecord, RecordChanges, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;

/// One offending input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, Vec<FieldError>>;

const STATUS_FIELD: &str = "status";
const PUBLISHED_AT_FIELD: &str = "publishedAt";

/// Validates a create payload. Required fields must be present and non-empty,
/// optional fields fall back to their defaults and `status` defaults to draft.
pub fn validate_create(model: &dyn ContentModel, payload: &JsonValue) -> ValidationResult<NewRecord> {
    let obj = as_object(payload)?;
    let mut errors = Vec::new();
    let mut fields = Map::new();

    for spec in model.fields() {
        match obj.get(spec.name) {
            None if spec.required => errors.push(FieldError::new(spec.name, "is required")),
            None => {
                fields.insert(spec.name.to_string(), spec.default_value());
            }
            Some(value) => {
                if let Some(v) = check_field(spec, value, &mut errors) {
                    fields.insert(spec.name.to_string(), v);
                }
            }
        }
    }

    let status = match obj.get(STATUS_FIELD) {
        None => Some(Status::default()),
        Some(v) => check_status(v, &mut errors),
    };
    let published_at = match obj.get(PUBLISHED_AT_FIELD) {
        None => Some(None),
        Some(v) => check_timestamp(v, &mut errors),
    };
    // A draft is created unpublished.
    if let (Some(Status::Draft), Some(Some(_))) = (status, published_at) {
        errors.push(FieldError::new(
            PUBLISHED_AT_FIELD,
            "must be null unless status is published",
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    match (status, published_at) {
        (Some(status), Some(published_at)) => Ok(NewRecord {
            fields,
            status,
            published_at,
        }),
        _ => Err(errors),
    }
}

/// Validates an update payload. Every field is optional; only the keys that
/// are present end up in the returned changes.
pub fn validate_update(model: &dyn ContentModel, payload: &JsonValue) -> ValidationResult<RecordChanges> {
    let obj = as_object(payload)?;
    let mut errors = Vec::new();
    let mut changes = RecordChanges::default();

    for spec in model.fields() {
        if let Some(value) = obj.get(spec.name) {
            if let Some(v) = check_field(spec, value, &mut errors) {
                changes.fields.insert(spec.name.to_string(), v);
            }
        }
    }
    if let Some(v) = obj.get(STATUS_FIELD) {
        changes.status = check_status(v, &mut errors);
    }
    if let Some(v) = obj.get(PUBLISHED_AT_FIELD) {
        changes.published_at = check_timestamp(v, &mut errors);
    }

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}

/// Parses the optional `status` query parameter. Absent or empty means no filter.
pub fn parse_status_filter(raw: Option<&str>) -> ValidationResult<Option<Status>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<Status>()
            .map(Some)
            .map_err(|msg| vec![FieldError::new(STATUS_FIELD, msg)]),
    }
}

/// Parses an id path parameter. Ids are positive integers.
pub fn parse_id(raw: &str) -> ValidationResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(vec![FieldError::new(
            "id",
            format!("must be a positive integer (got '{}')", raw),
        )]),
    }
}

fn as_object(payload: &JsonValue) -> ValidationResult<&Map<String, JsonValue>> {
    payload
        .as_object()
        .ok_or_else(|| vec![FieldError::new("body", "must be a JSON object")])
}

fn check_field(spec: &FieldSpec, value: &JsonValue, errors: &mut Vec<FieldError>) -> Option<JsonValue> {
    match spec.kind {
        FieldKind::Text { max_chars, trim } => {
            let s = match value {
                JsonValue::Null if spec.required => {
                    errors.push(FieldError::new(spec.name, "must not be null"));
                    return None;
                }
                JsonValue::Null => return Some(JsonValue::Null),
                JsonValue::String(s) => s,
                _ => {
                    errors.push(FieldError::new(spec.name, "must be a string"));
                    return None;
                }
            };
            let s = if trim { s.trim() } else { s.as_str() };
            if spec.required && s.trim().is_empty() {
                errors.push(FieldError::new(spec.name, "must not be empty"));
                return None;
            }
            if let Some(max) = max_chars {
                if s.chars().count() > max {
                    errors.push(FieldError::new(
                        spec.name,
                        format!("must be at most {} characters", max),
                    ));
                    return None;
                }
            }
            Some(JsonValue::String(s.to_string()))
        }
        FieldKind::Url => match value {
            JsonValue::Null => Some(JsonValue::Null),
            JsonValue::String(s) if s.trim().is_empty() => Some(JsonValue::Null),
            JsonValue::String(s) => {
                let s = s.trim();
                match url::Url::parse(s) {
                    Ok(u) if u.has_host() => Some(JsonValue::String(s.to_string())),
                    _ => {
                        errors.push(FieldError::new(spec.name, "must be a valid URL"));
                        None
                    }
                }
            }
            _ => {
                errors.push(FieldError::new(spec.name, "must be a string"));
                None
            }
        },
        FieldKind::Bool => match value {
            JsonValue::Bool(b) => Some(JsonValue::Bool(*b)),
            _ => {
                errors.push(FieldError::new(spec.name, "must be a boolean"));
                None
            }
        },
    }
}

fn check_status(value: &JsonValue, errors: &mut Vec<FieldError>) -> Option<Status> {
    match value.as_str().map(str::parse::<Status>) {
        Some(Ok(status)) => Some(status),
        Some(Err(msg)) => {
            errors.push(FieldError::new(STATUS_FIELD, msg));
            None
        }
        None => {
            errors.push(FieldError::new(
                STATUS_FIELD,
                "must be one of: draft, published",
            ));
            None
        }
    }
}

fn check_timestamp(value: &JsonValue, errors: &mut Vec<FieldError>) -> Option<Option<DateTime<Utc>>> {
    match value {
        JsonValue::Null => Some(None),
        JsonValue::String(s) => match DateTime::parse_from_rfc3339(s.trim()) {
            Ok(dt) => Some(Some(dt.with_timezone(&Utc))),
            Err(_) => {
                errors.push(FieldError::new(
                    PUBLISHED_AT_FIELD,
                    "must be an RFC 3339 timestamp",
                ));
                None
            }
        },
        _ => {
            errors.push(FieldError::new(
                PUBLISHED_AT_FIELD,
                "must be an RFC 3339 timestamp or null",
            ));
            None
        }
    }
}
