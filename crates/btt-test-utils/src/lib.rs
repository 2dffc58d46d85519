//! Testing utilities for BTT preset workspace
//!
//! Shared fixtures: a small keyed archive predicate, app entries and a
//! complete preset archive.

#![allow(missing_docs)]

use btt_graph::{AppIdentity, ConditionCodec, KeyedArchiveCodec, ObjectGraph};
use plist::{Dictionary, Uid, Value};
use serde_json::json;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const PRESET_JSON_ENTRY: &str = "presetjson.bttpreset";
pub const ICON_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 13, 1, 2, 3, 4];
pub const README_TEXT: &str = "AquaTouch preset\nInstall by double clicking.\n";

pub fn vscode() -> AppIdentity {
    AppIdentity::new("com.microsoft.VSCode", "Visual Studio Code")
}

pub fn vscode_insiders() -> AppIdentity {
    AppIdentity::new("com.microsoft.VSCodeInsiders", "Visual Studio Code - Insiders")
}

pub fn vscode_exploration() -> AppIdentity {
    AppIdentity::new("com.microsoft.VSCodeExploration", "Visual Studio Code - Exploration")
}

pub fn uid(index: u64) -> Value {
    Value::Uid(Uid::new(index))
}

pub fn string(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn dict(entries: Vec<(&str, Value)>) -> Value {
    Value::Dictionary(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<Dictionary>(),
    )
}

/// `bundleIdentifier == <bundle>` comparison rooted at `head`
fn comparison(head: u64, bundle: &str) -> Vec<Value> {
    vec![
        dict(vec![
            ("$class", uid(2)),
            ("NSLeftExpression", uid(head + 1)),
            ("NSRightExpression", uid(head + 2)),
        ]),
        dict(vec![("$class", uid(2)), ("NSKeyPath", uid(3))]),
        dict(vec![("$class", uid(2)), ("NSConstantValue", uid(head + 3))]),
        string(bundle),
    ]
}

/// OR of Safari (objects 4..=7) and VS Code (objects 8..=11)
///
/// Object 1 is the root list, 2 a shared class record, 3 the shared key path.
pub fn predicate_graph() -> ObjectGraph {
    let mut objects = vec![
        string("$null"),
        dict(vec![
            ("$class", uid(2)),
            ("NSCompoundPredicateType", Value::Integer(2_i64.into())),
            ("NS.objects", Value::Array(vec![uid(4), uid(8)])),
        ]),
        dict(vec![
            ("$classname", string("NSPredicate")),
            ("$classes", Value::Array(vec![string("NSPredicate"), string("NSObject")])),
        ]),
        string("bundleIdentifier"),
    ];
    objects.extend(comparison(4, "com.apple.Safari"));
    objects.extend(comparison(8, "com.microsoft.VSCode"));
    ObjectGraph::from_objects(objects)
}

pub fn condition_blob() -> String {
    KeyedArchiveCodec.encode(&predicate_graph()).unwrap()
}

pub fn vscode_entry() -> serde_json::Value {
    json!({
        "BTTAppBundleIdentifier": "com.microsoft.VSCode",
        "BTTAppName": "Visual Studio Code",
        "BTTAppAutoInvertIcon": 1,
        "BTTTriggers": [
            {
                "BTTTriggerType": 10,
                "BTTTriggerClass": "BTTTriggerTypeTouchBar",
                "BTTUUID": "9E4C3E0B-3D55-4C44-8F0E-1C1D4E7A2B01",
                "BTTAdditionalActions": [
                    {"BTTPredefinedActionType": 5, "BTTUUID": "3C1B2A77-6E0E-4F0B-9B57-2A9E3C1B4D02"}
                ]
            },
            {
                "BTTTriggerType": 653,
                "BTTTriggerClass": "BTTTriggerTypeTouchBar",
                "BTTUUID": "5D2E7F10-8A4B-4B21-A5C3-7E6F1D0C9E03"
            }
        ]
    })
}

pub fn fallback_entry(condition: &str) -> serde_json::Value {
    json!({
        "BTTAppBundleIdentifier": "BT.G.UNSUPPORTED",
        "BTTAppName": "UNSUPPORTED APP (fallback)",
        "BTTActivationGroupName": "Unsupported apps",
        "BTTActivationGroupCondition": condition,
        "BTTTriggers": [
            {"BTTTriggerType": 653, "BTTUUID": "0A1B2C3D-4E5F-4061-8293-A4B5C6D7E804"}
        ]
    })
}

pub fn sample_document() -> serde_json::Value {
    json!({
        "BTTPresetName": "AquaTouch",
        "BTTGeneralSettings": {"BTTTouchBarVisible": true},
        "BTTPresetContent": [
            {
                "BTTAppBundleIdentifier": "BT.G",
                "BTTAppName": "Global",
                "BTTTriggers": [
                    {"BTTTriggerType": 653, "BTTUUID": "11111111-2222-4333-8444-555555555501"},
                    {"BTTTriggerType": 653, "BTTUUID": "11111111-2222-4333-8444-555555555502"},
                    {"BTTTriggerType": 1, "BTTUUID": "11111111-2222-4333-8444-555555555503"}
                ]
            },
            {
                "BTTAppBundleIdentifier": "BT.MediaKeys",
                "BTTAppName": "Media Key Shortcuts",
                "BTTTriggers": [{"BTTTriggerType": 653}]
            },
            vscode_entry(),
            fallback_entry(&condition_blob())
        ]
    })
}

/// Zip with `entries` written in order
pub fn zip_with_entries(entries: &[(&str, &[u8], CompressionMethod)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data, method) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default().compression_method(*method))
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Preset archive: icon (stored), document (deflated), readme (deflated)
pub fn sample_preset_archive() -> Vec<u8> {
    preset_archive_with(&sample_document())
}

pub fn preset_archive_with(document: &serde_json::Value) -> Vec<u8> {
    let json = serde_json::to_vec(document).unwrap();
    zip_with_entries(&[
        ("icons/vscode.png", ICON_BYTES, CompressionMethod::Stored),
        (PRESET_JSON_ENTRY, json.as_slice(), CompressionMethod::Deflated),
        ("README.txt", README_TEXT.as_bytes(), CompressionMethod::Deflated),
    ])
}
