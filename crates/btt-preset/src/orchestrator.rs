//! Patch pass over a preset document
//!
//! One pass in document order. Deleted entries skip every later step;
//! clones are queued and appended after the pass so they are never visited.

use crate::clone::clone_entry;
use crate::document::{
    json_type_name, trigger_type, AppEntry, PresetDocument, ACTIVATION_GROUP_CONDITION_KEY, TRIGGERS_KEY,
};
use crate::error::PatchError;
use crate::profile::PatchProfile;
use btt_graph::{graft, locate, AppIdentity, CodecError, ConditionCodec, KeyedArchiveCodec};
use serde_json::Value;
use std::collections::BTreeSet;

/// Counts from one [`Patcher::patch`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    /// App entries removed
    pub deleted_apps: usize,
    /// Trigger entries removed
    pub deleted_triggers: usize,
    /// Cloned entries appended
    pub clones_added: usize,
    /// Activation group conditions rewritten
    pub conditions_grafted: usize,
}

/// Applies a [`PatchProfile`] to preset documents
#[derive(Debug, Clone)]
pub struct Patcher<C = KeyedArchiveCodec> {
    profile: PatchProfile,
    codec: C,
}

impl Patcher {
    /// Create a patcher using the keyed archive codec
    #[must_use]
    pub fn new(profile: PatchProfile) -> Self {
        Self::with_codec(profile, KeyedArchiveCodec)
    }
}

impl<C: ConditionCodec> Patcher<C> {
    /// Create a patcher with a custom condition codec
    #[must_use]
    pub fn with_codec(profile: PatchProfile, codec: C) -> Self {
        Self { profile, codec }
    }

    /// Patch `document` in place
    ///
    /// On error the document may be partially modified and should be discarded.
    ///
    /// # Errors
    /// - [`PatchError::Profile`] when the profile fails [`PatchProfile::validate`]
    /// - [`PatchError::Document`] when `BTTPresetContent` is missing
    /// - [`PatchError::CloneFailed`], [`PatchError::Condition`], [`PatchError::Graft`] from the steps
    /// - [`PatchError::SourceNotFound`] when a clone source never appeared
    pub fn patch(&self, document: &mut PresetDocument) -> Result<PatchSummary, PatchError> {
        self.profile.validate()?;
        let apps = document.apps_mut()?;
        let mut summary = PatchSummary::default();
        let mut found = BTreeSet::new();
        let mut queued = Vec::new();

        let mut index = 0;
        while index < apps.len() {
            let name = AppEntry::new(&apps[index]).map(|e| e.name().to_string()).unwrap_or_default();
            tracing::info!("Checking {}...", name);

            if let Some(pattern) = self.profile.app_deletion_match(&name) {
                tracing::info!("Deleting it... (matched '{}')", pattern);
                apps.remove(index);
                summary.deleted_apps += 1;
                continue;
            }

            let app = &mut apps[index];
            summary.deleted_triggers += self.remove_triggers(app);
            queued.extend(self.clone_if_source(app, &mut found)?);
            if self.graft_if_fallback(app, &name)? {
                summary.conditions_grafted += 1;
            }
            index += 1;
        }

        summary.clones_added = queued.len();
        apps.extend(queued);

        let missing: Vec<AppIdentity> = self
            .profile
            .clones
            .iter()
            .filter(|rule| !found.contains(&rule.source))
            .map(|rule| rule.source.clone())
            .collect();
        if !missing.is_empty() {
            return Err(PatchError::SourceNotFound { missing });
        }
        for rule in &self.profile.clones {
            tracing::info!("Config could be copied successfully for {}", rule.source);
        }

        Ok(summary)
    }

    fn remove_triggers(&self, app: &mut Value) -> usize {
        let Some(triggers) = app.get_mut(TRIGGERS_KEY).and_then(Value::as_array_mut) else {
            return 0;
        };
        let before = triggers.len();
        let mut position = 0;
        triggers.retain(|trigger| {
            let keep = !trigger_type(trigger).is_some_and(|t| self.profile.deletes_trigger(t));
            if !keep {
                tracing::info!("Found trigger to delete at pos {}", position);
            }
            position += 1;
            keep
        });
        before - triggers.len()
    }

    fn clone_if_source(
        &self,
        app: &Value,
        found: &mut BTreeSet<AppIdentity>,
    ) -> Result<Vec<Value>, PatchError> {
        let Some(entry) = AppEntry::new(app) else {
            return Ok(Vec::new());
        };
        let identity = entry.identity();
        let Some(rule) = identity.and_then(|id| self.profile.clone_rule_for(&id)) else {
            return Ok(Vec::new());
        };
        found.insert(rule.source.clone());

        rule.targets
            .iter()
            .map(|target| {
                tracing::debug!("Cloning {} as {}", rule.source, target);
                clone_entry(app, target).map_err(|source| PatchError::CloneFailed {
                    from: rule.source.clone(),
                    to: target.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Graft every clone source into the fallback entry's condition
    fn graft_if_fallback(&self, app: &mut Value, name: &str) -> Result<bool, PatchError> {
        let Some(entry) = AppEntry::new(app) else {
            return Ok(false);
        };
        if !entry.has_activation_group() || !self.profile.is_unsupported_app(name) {
            return Ok(false);
        }
        if self.profile.clones.is_empty() {
            tracing::debug!("No clone rules, leaving condition of '{}' as is", name);
            return Ok(false);
        }

        let condition_error = |source| PatchError::Condition {
            app: name.to_string(),
            source,
        };
        let Some(condition) = entry.condition() else {
            let found = app.get(ACTIVATION_GROUP_CONDITION_KEY).map_or("null", json_type_name);
            return Err(condition_error(CodecError::NotAString { found }));
        };
        let mut graph = self.codec.decode(condition).map_err(condition_error)?;
        for rule in &self.profile.clones {
            let graft_error = |source| PatchError::Graft {
                app: name.to_string(),
                source_app: rule.source.clone(),
                source,
            };
            let range = locate(&graph, &rule.source).map_err(graft_error)?;
            graft(&mut graph, range, &rule.source, &rule.targets).map_err(graft_error)?;
        }
        tracing::info!("Added to root tree - encoding condition for '{}'", name);
        let encoded = self.codec.encode(&graph).map_err(condition_error)?;

        if let Some(fields) = app.as_object_mut() {
            fields.insert(ACTIVATION_GROUP_CONDITION_KEY.to_string(), Value::String(encoded));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProfileError;
    use crate::profile::CloneRule;
    use serde_json::json;

    fn document(apps: Value) -> PresetDocument {
        PresetDocument::from_value(json!({ "BTTPresetContent": apps }))
    }

    fn no_clones() -> PatchProfile {
        PatchProfile::default().with_clones(vec![])
    }

    fn a_to_b() -> PatchProfile {
        no_clones().with_clones(vec![CloneRule::new(
            AppIdentity::new("com.a", "A"),
            vec![AppIdentity::new("com.b", "B")],
        )])
    }

    fn fallback(condition: Value) -> Value {
        json!({
            "BTTAppName": "UNSUPPORTED APP",
            "BTTActivationGroupName": "g",
            "BTTActivationGroupCondition": condition,
        })
    }

    fn names(doc: &PresetDocument) -> Vec<String> {
        doc.apps()
            .unwrap()
            .iter()
            .map(|app| app["BTTAppName"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn deleted_app_is_skipped_entirely() {
        let mut doc = document(json!([
            {"BTTAppName": "Media Key Shortcuts", "BTTTriggers": [{"BTTTriggerType": 653}]},
            {"BTTAppName": "Media Key Shortcuts 2"},
            {"BTTAppName": "Safari", "BTTTriggers": []},
        ]));
        let summary = Patcher::new(no_clones()).patch(&mut doc).unwrap();
        assert_eq!(names(&doc), vec!["Safari"]);
        assert_eq!(summary.deleted_apps, 2);
        assert_eq!(summary.deleted_triggers, 0);
    }

    #[test]
    fn adjacent_triggers_are_all_removed() {
        let mut doc = document(json!([{
            "BTTAppName": "Finder",
            "BTTTriggers": [
                {"BTTTriggerType": 653},
                {"BTTTriggerType": 653},
                {"BTTTriggerType": 10},
                {"BTTTriggerType": "653"},
            ],
        }]));
        let summary = Patcher::new(no_clones()).patch(&mut doc).unwrap();
        let triggers = doc.apps().unwrap()[0]["BTTTriggers"].as_array().unwrap().clone();
        assert_eq!(triggers, vec![json!({"BTTTriggerType": 10}), json!({"BTTTriggerType": "653"})]);
        assert_eq!(summary.deleted_triggers, 2);
    }

    #[test]
    fn clones_follow_source_after_filtering() {
        let mut doc = document(json!([
            {
                "BTTAppBundleIdentifier": "com.a",
                "BTTAppName": "A",
                "BTTTriggers": [{"BTTTriggerType": 653, "BTTUUID": "X"}, {"BTTTriggerType": 1, "BTTUUID": "Y"}],
            },
            {"BTTAppName": "Z"},
        ]));
        let profile = no_clones().with_clones(vec![CloneRule::new(
            AppIdentity::new("com.a", "A"),
            vec![AppIdentity::new("com.b", "B"), AppIdentity::new("com.c", "C")],
        )]);
        let summary = Patcher::new(profile).patch(&mut doc).unwrap();

        assert_eq!(names(&doc), vec!["A", "Z", "B", "C"]);
        assert_eq!(summary.clones_added, 2);
        let clone = &doc.apps().unwrap()[2];
        assert_eq!(clone["BTTAppBundleIdentifier"], "com.b");
        assert_eq!(clone["BTTTriggers"].as_array().unwrap().len(), 1);
        assert_ne!(clone["BTTTriggers"][0]["BTTUUID"], "Y");
    }

    #[test]
    fn missing_source_fails_after_pass() {
        let mut doc = document(json!([{"BTTAppName": "Safari"}]));
        let err = Patcher::new(PatchProfile::default()).patch(&mut doc).unwrap_err();
        assert!(err.is_source_not_found());
    }

    #[test]
    fn source_identity_must_match_both_fields() {
        let mut doc = document(json!([
            {"BTTAppBundleIdentifier": "com.microsoft.VSCode", "BTTAppName": "Code"},
        ]));
        assert!(Patcher::new(PatchProfile::default()).patch(&mut doc).unwrap_err().is_source_not_found());
    }

    #[test]
    fn missing_content_is_reported() {
        let mut doc = PresetDocument::from_value(json!({}));
        assert!(matches!(
            Patcher::new(no_clones()).patch(&mut doc),
            Err(PatchError::Document(_))
        ));
    }

    #[test]
    fn bad_condition_is_reported_with_app() {
        let mut doc = document(json!([
            {"BTTAppBundleIdentifier": "com.a", "BTTAppName": "A"},
            fallback(json!("***")),
        ]));
        match Patcher::new(a_to_b()).patch(&mut doc) {
            Err(PatchError::Condition { app, .. }) => assert_eq!(app, "UNSUPPORTED APP"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_string_condition_is_reported() {
        let mut doc = document(json!([
            {"BTTAppBundleIdentifier": "com.a", "BTTAppName": "A"},
            fallback(json!(5)),
        ]));
        match Patcher::new(a_to_b()).patch(&mut doc) {
            Err(PatchError::Condition {
                app,
                source: CodecError::NotAString { found },
            }) => {
                assert_eq!(app, "UNSUPPORTED APP");
                assert_eq!(found, "number");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn condition_untouched_without_clone_rules() {
        let mut doc = document(json!([fallback(json!("***"))]));
        let summary = Patcher::new(no_clones()).patch(&mut doc).unwrap();
        assert_eq!(summary.conditions_grafted, 0);
        assert_eq!(doc.apps().unwrap()[0]["BTTActivationGroupCondition"], "***");
    }

    #[test]
    fn invalid_profile_is_rejected_before_patching() {
        let mut doc = document(json!([{"BTTAppName": "Media Key Shortcuts"}]));
        let blank = PatchProfile {
            unsupported_app_marker: String::new(),
            ..no_clones()
        };
        assert!(matches!(
            Patcher::new(blank).patch(&mut doc),
            Err(PatchError::Profile(ProfileError::EmptyMarker))
        ));

        let rule = a_to_b().clones.remove(0);
        let duplicate = no_clones().with_clones(vec![rule.clone(), rule]);
        assert!(matches!(
            Patcher::new(duplicate).patch(&mut doc),
            Err(PatchError::Profile(ProfileError::DuplicateSource(_)))
        ));
        assert_eq!(names(&doc), vec!["Media Key Shortcuts"]);
    }

    #[test]
    fn entry_without_activation_group_is_not_grafted() {
        let mut doc = document(json!([{"BTTAppName": "UNSUPPORTED APP", "BTTActivationGroupCondition": "***"}]));
        let summary = Patcher::new(no_clones()).patch(&mut doc).unwrap();
        assert_eq!(summary.conditions_grafted, 0);
    }
}
