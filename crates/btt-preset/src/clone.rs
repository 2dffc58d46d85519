//! App entry cloning
//!
//! A clone is a deep copy of the source entry carrying the target's name and
//! bundle identifier. Every `BTTUUID` leaf, at any depth, gets a fresh value
//! so BTT does not treat the copies as the same triggers.

use crate::document::{json_type_name, APP_NAME_KEY, BUNDLE_ID_KEY, UUID_KEY};
use crate::error::CloneError;
use btt_graph::{walk_with, AppIdentity};
use serde_json::Value;
use uuid::Uuid;

/// Deep copy `source` as `target`
///
/// # Errors
/// - [`CloneError::NotAnObject`] when `source` is not a JSON object
/// - [`CloneError::UuidNotString`] when a `BTTUUID` leaf is not a string
pub fn clone_entry(source: &Value, target: &AppIdentity) -> Result<Value, CloneError> {
    let mut entry = source.clone();
    let fields = entry.as_object_mut().ok_or(CloneError::NotAnObject)?;
    fields.insert(APP_NAME_KEY.to_string(), Value::String(target.name.clone()));
    fields.insert(BUNDLE_ID_KEY.to_string(), Value::String(target.bundle_id.clone()));

    walk_with(&mut entry, regenerate_uuid)?;
    Ok(entry)
}

/// Upper-case hyphenated random UUID, the form BTT writes
#[must_use]
pub fn fresh_uuid() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

fn regenerate_uuid(key: Option<&str>, value: &mut Value) -> Result<Option<Value>, CloneError> {
    if key != Some(UUID_KEY) {
        return Ok(None);
    }
    match value {
        Value::String(_) => Ok(Some(Value::String(fresh_uuid()))),
        other => Err(CloneError::UuidNotString {
            found: json_type_name(other),
        }),
    }
}
