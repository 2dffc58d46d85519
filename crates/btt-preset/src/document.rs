//! BTT preset configuration document
//!
//! `presetjson.bttpreset` is a JSON object whose `BTTPresetContent` array
//! holds one entry per application. Only the handful of keys the patcher
//! touches are modelled; everything else rides along untouched and in order.

use crate::error::DocumentError;
use btt_graph::AppIdentity;
use serde_json::{Map, Value};

/// Root key holding the app entries
pub const PRESET_CONTENT_KEY: &str = "BTTPresetContent";
/// App display name
pub const APP_NAME_KEY: &str = "BTTAppName";
/// App bundle identifier
pub const BUNDLE_ID_KEY: &str = "BTTAppBundleIdentifier";
/// Trigger list of an app entry
pub const TRIGGERS_KEY: &str = "BTTTriggers";
/// Trigger type discriminant
pub const TRIGGER_TYPE_KEY: &str = "BTTTriggerType";
/// Unique identifier field, anywhere in an entry
pub const UUID_KEY: &str = "BTTUUID";
/// Activation group name
pub const ACTIVATION_GROUP_NAME_KEY: &str = "BTTActivationGroupName";
/// Activation group condition (base64 keyed archive)
pub const ACTIVATION_GROUP_CONDITION_KEY: &str = "BTTActivationGroupCondition";

/// Parsed preset configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PresetDocument {
    root: Value,
}

impl PresetDocument {
    /// Wrap an already parsed JSON value
    #[inline]
    #[must_use]
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Parse document bytes
    ///
    /// # Errors
    /// Returns [`DocumentError::Json`] for malformed JSON.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        Ok(Self::from_value(serde_json::from_slice(bytes)?))
    }

    /// Serialize the document
    ///
    /// # Errors
    /// Returns [`DocumentError::Json`] if serialization fails.
    pub fn to_vec(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(serde_json::to_vec(&self.root)?)
    }

    /// Root JSON value
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Consume into the root JSON value
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.root
    }

    /// App entries
    ///
    /// # Errors
    /// Returns [`DocumentError::MissingPresetContent`] when the root key is absent or not an array.
    pub fn apps(&self) -> Result<&Vec<Value>, DocumentError> {
        self.root
            .get(PRESET_CONTENT_KEY)
            .and_then(Value::as_array)
            .ok_or(DocumentError::MissingPresetContent)
    }

    /// Mutable app entries
    ///
    /// # Errors
    /// Returns [`DocumentError::MissingPresetContent`] when the root key is absent or not an array.
    pub fn apps_mut(&mut self) -> Result<&mut Vec<Value>, DocumentError> {
        self.root
            .get_mut(PRESET_CONTENT_KEY)
            .and_then(Value::as_array_mut)
            .ok_or(DocumentError::MissingPresetContent)
    }
}

/// Read-only view over one app entry
#[derive(Debug, Clone, Copy)]
pub struct AppEntry<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> AppEntry<'a> {
    /// View `value` as an app entry; `None` unless it is a JSON object
    #[must_use]
    pub fn new(value: &'a Value) -> Option<Self> {
        value.as_object().map(|fields| Self { fields })
    }

    /// Display name, empty when absent
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.str_field(APP_NAME_KEY).unwrap_or_default()
    }

    /// Bundle identifier
    #[must_use]
    pub fn bundle_id(&self) -> Option<&'a str> {
        self.str_field(BUNDLE_ID_KEY)
    }

    /// Bundle identifier and display name; `None` without a bundle identifier
    #[must_use]
    pub fn identity(&self) -> Option<AppIdentity> {
        self.bundle_id().map(|bundle_id| AppIdentity::new(bundle_id, self.name()))
    }

    /// Whether both activation group fields are present
    #[must_use]
    pub fn has_activation_group(&self) -> bool {
        self.fields.contains_key(ACTIVATION_GROUP_NAME_KEY)
            && self.fields.contains_key(ACTIVATION_GROUP_CONDITION_KEY)
    }

    /// Activation group condition text
    #[must_use]
    pub fn condition(&self) -> Option<&'a str> {
        self.str_field(ACTIVATION_GROUP_CONDITION_KEY)
    }

    fn str_field(&self, key: &str) -> Option<&'a str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Trigger type discriminant of a trigger entry
#[must_use]
pub fn trigger_type(trigger: &Value) -> Option<i64> {
    trigger.get(TRIGGER_TYPE_KEY).and_then(Value::as_i64)
}

/// Name of the JSON type of `value`, for diagnostics
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
