//! Patch profile
//!
//! Which triggers and apps to drop and which apps to clone. The defaults
//! reproduce the AquaTouch cleanup; a TOML file can override any field.
//!
//! ```toml
//! trigger_types_to_delete = [653]
//! apps_to_delete = ["Media Key Shortcuts"]
//!
//! [[clones]]
//! source = { bundle_id = "com.microsoft.VSCode", name = "Visual Studio Code" }
//! targets = [
//!     { bundle_id = "com.microsoft.VSCodeInsiders", name = "Visual Studio Code - Insiders" },
//! ]
//! ```

use crate::error::ProfileError;
use btt_graph::AppIdentity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Touch Bar context trigger
pub const TOUCH_BAR_CONTEXT_TRIGGER: i64 = 653;

/// Clone one app entry as one or more other apps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneRule {
    /// Entry to copy
    pub source: AppIdentity,
    /// Identities given to the copies, in order
    pub targets: Vec<AppIdentity>,
}

impl CloneRule {
    /// Create a rule
    #[must_use]
    pub fn new(source: AppIdentity, targets: Vec<AppIdentity>) -> Self {
        Self { source, targets }
    }
}

/// Patch profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchProfile {
    /// Trigger types removed from every app
    pub trigger_types_to_delete: BTreeSet<i64>,
    /// App entries whose display name contains any of these are removed
    pub apps_to_delete: Vec<String>,
    /// Display name marker of the fallback entry whose condition gets grafted
    pub unsupported_app_marker: String,
    /// Clone rules
    pub clones: Vec<CloneRule>,
}

impl PatchProfile {
    /// Create default profile
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML profile
    ///
    /// # Errors
    /// Returns [`ProfileError`] for malformed TOML or an invalid clone rule.
    pub fn from_toml_str(text: &str) -> Result<Self, ProfileError> {
        let profile: Self = toml::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Read, parse and validate a TOML profile file
    ///
    /// # Errors
    /// Returns [`ProfileError::Io`] when the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the marker and clone rules
    ///
    /// # Errors
    /// - [`ProfileError::NoTargets`] for a rule without targets
    /// - [`ProfileError::SelfTarget`] for a rule that targets its own source
    /// - [`ProfileError::DuplicateSource`] when two rules share a source
    /// - [`ProfileError::EmptyMarker`] when the unsupported-app marker is empty
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.unsupported_app_marker.trim().is_empty() {
            return Err(ProfileError::EmptyMarker);
        }
        let mut sources = HashSet::new();
        for rule in &self.clones {
            if rule.targets.is_empty() {
                return Err(ProfileError::NoTargets(rule.source.clone()));
            }
            if rule.targets.contains(&rule.source) {
                return Err(ProfileError::SelfTarget(rule.source.clone()));
            }
            if !sources.insert(&rule.source) {
                return Err(ProfileError::DuplicateSource(rule.source.clone()));
            }
        }
        Ok(())
    }

    /// Clone rule whose source is `identity`
    #[must_use]
    pub fn clone_rule_for(&self, identity: &AppIdentity) -> Option<&CloneRule> {
        self.clones.iter().find(|rule| &rule.source == identity)
    }

    /// Deletion pattern contained in `name`, if any
    #[must_use]
    pub fn app_deletion_match(&self, name: &str) -> Option<&str> {
        self.apps_to_delete
            .iter()
            .map(String::as_str)
            .find(|pattern| name.contains(pattern))
    }

    /// Whether triggers of `trigger_type` are removed
    #[inline]
    #[must_use]
    pub fn deletes_trigger(&self, trigger_type: i64) -> bool {
        self.trigger_types_to_delete.contains(&trigger_type)
    }

    /// Whether `name` marks the unsupported-app fallback entry
    #[must_use]
    pub fn is_unsupported_app(&self, name: &str) -> bool {
        name.to_uppercase()
            .contains(&self.unsupported_app_marker.to_uppercase())
    }

    /// With trigger types to delete
    #[inline]
    #[must_use]
    pub fn with_trigger_types(mut self, types: impl IntoIterator<Item = i64>) -> Self {
        self.trigger_types_to_delete = types.into_iter().collect();
        self
    }

    /// With app name patterns to delete
    #[inline]
    #[must_use]
    pub fn with_apps_to_delete(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.apps_to_delete = names.into_iter().map(Into::into).collect();
        self
    }

    /// With clone rules
    #[inline]
    #[must_use]
    pub fn with_clones(mut self, clones: Vec<CloneRule>) -> Self {
        self.clones = clones;
        self
    }
}

impl Default for PatchProfile {
    fn default() -> Self {
        Self {
            trigger_types_to_delete: BTreeSet::from([TOUCH_BAR_CONTEXT_TRIGGER]),
            apps_to_delete: vec!["Media Key Shortcuts".to_string()],
            unsupported_app_marker: "UNSUPPORTED APP".to_string(),
            clones: vec![CloneRule::new(
                AppIdentity::new("com.microsoft.VSCode", "Visual Studio Code"),
                vec![
                    AppIdentity::new("com.microsoft.VSCodeInsiders", "Visual Studio Code - Insiders"),
                    AppIdentity::new("com.microsoft.VSCodeExploration", "Visual Studio Code - Exploration"),
                ],
            )],
        }
    }
}
