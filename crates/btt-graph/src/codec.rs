//! Activation group condition codec
//!
//! BTT stores the condition as base64 text wrapping a binary property list
//! produced by `NSKeyedArchiver`.

use crate::error::CodecError;
use crate::graph::ObjectGraph;
use base64::{engine::general_purpose, Engine as _};
use plist::Value;
use std::io::Cursor;

/// Conversion between condition text and an [`ObjectGraph`]
pub trait ConditionCodec {
    /// Decode condition text
    ///
    /// # Errors
    /// Fails when the text is not an encoded keyed archive.
    fn decode(&self, condition: &str) -> Result<ObjectGraph, CodecError>;

    /// Encode a graph back to condition text
    ///
    /// # Errors
    /// Fails when the property list cannot be written.
    fn encode(&self, graph: &ObjectGraph) -> Result<String, CodecError>;
}

/// Base64 + binary plist codec used by BTT presets
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyedArchiveCodec;

impl ConditionCodec for KeyedArchiveCodec {
    fn decode(&self, condition: &str) -> Result<ObjectGraph, CodecError> {
        let text = condition.trim();
        // Exports seen in the wild use either alphabet
        let bytes = general_purpose::STANDARD
            .decode(text)
            .or_else(|_| general_purpose::URL_SAFE.decode(text))?;
        let archive = Value::from_reader(Cursor::new(bytes))?;
        ObjectGraph::from_archive(archive)
    }

    fn encode(&self, graph: &ObjectGraph) -> Result<String, CodecError> {
        let mut archive = graph.to_archive();
        sort_keys(&mut archive);
        let mut bytes = Vec::new();
        archive.to_writer_binary(&mut bytes)?;
        Ok(general_purpose::STANDARD.encode(bytes))
    }
}

/// Recursively order dictionary keys so encoding is deterministic
fn sort_keys(value: &mut Value) {
    match value {
        Value::Dictionary(dict) => {
            dict.sort_keys();
            dict.iter_mut().for_each(|(_, child)| sort_keys(child));
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}
