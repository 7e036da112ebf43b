//! Publish-timestamp rule.
//!
//! A write that makes an entity `published` without naming a publish time
//! stamps `publishedAt` with the time of that write. An explicit `null` does
//! not count as naming a publish time. A non-null value is always kept.

use crate::domain::model::{NewRecord, Record, RecordChanges, Status};
use chrono::{DateTime, Utc};

/// Stamps a record about to be created. Returns true if the stamp fired.
pub fn stamp_on_create(new: &mut NewRecord, now: DateTime<Utc>) -> bool {
    if new.status == Status::Published && new.published_at.is_none() {
        new.published_at = Some(now);
        return true;
    }
    false
}

/// Stamps an update against the stored record. Returns true if the stamp fired.
///
/// Only fires when the update itself sets `status: published`; re-publishing
/// keeps an existing timestamp unless the same update clears it.
pub fn stamp_on_update(changes: &mut RecordChanges, existing: &Record, now: DateTime<Utc>) -> bool {
    if changes.status != Some(Status::Published) {
        return false;
    }
    let effective = match changes.published_at {
        Some(explicit) => explicit,
        None => existing.published_at,
    };
    if effective.is_some() {
        return false;
    }
    changes.published_at = Some(Some(now));
    true
}
