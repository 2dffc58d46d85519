//! Keyed-archive object graph
//!
//! An `NSKeyedArchiver` archive stores every object in one flat `$objects`
//! array. Objects point at each other through `Uid` reference markers that
//! index into that same array; there is no schema beyond that.

use crate::error::CodecError;
use plist::{Dictionary, Uid, Value};

/// Archive key holding the flat object table
pub const OBJECTS_KEY: &str = "$objects";

/// Field of an NS collection object holding its member references
pub const NS_OBJECTS_KEY: &str = "NS.objects";

/// Decoded keyed archive: header fields plus the object table
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectGraph {
    header: Dictionary,
    objects: Vec<Value>,
}

impl ObjectGraph {
    /// Split a decoded archive into header and object table
    ///
    /// # Errors
    /// The root must be a dictionary with an `$objects` array.
    pub fn from_archive(archive: Value) -> Result<Self, CodecError> {
        let Value::Dictionary(mut header) = archive else {
            return Err(CodecError::NotAnArchive);
        };
        match header.remove(OBJECTS_KEY) {
            Some(Value::Array(objects)) => Ok(Self { header, objects }),
            _ => Err(CodecError::MissingObjects),
        }
    }

    /// Build a graph around a bare object table
    ///
    /// The header mirrors what `NSKeyedArchiver` writes, with the root object at index 1.
    #[must_use]
    pub fn from_objects(objects: Vec<Value>) -> Self {
        let mut top = Dictionary::new();
        top.insert("root".to_string(), Value::Uid(Uid::new(1)));

        let mut header = Dictionary::new();
        header.insert(
            "$archiver".to_string(),
            Value::String("NSKeyedArchiver".to_string()),
        );
        header.insert("$top".to_string(), Value::Dictionary(top));
        header.insert("$version".to_string(), Value::Integer(100_000_i64.into()));
        Self { header, objects }
    }

    /// Reassemble the archive value
    #[must_use]
    pub fn to_archive(&self) -> Value {
        let mut archive = self.header.clone();
        archive.insert(OBJECTS_KEY.to_string(), Value::Array(self.objects.clone()));
        Value::Dictionary(archive)
    }

    /// The object table
    #[inline]
    #[must_use]
    pub fn objects(&self) -> &[Value] {
        &self.objects
    }

    /// Mutable object table
    #[inline]
    pub fn objects_mut(&mut self) -> &mut Vec<Value> {
        &mut self.objects
    }

    /// Number of objects
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the object table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object at a reference index
    #[must_use]
    pub fn get(&self, index: u64) -> Option<&Value> {
        usize::try_from(index).ok().and_then(|i| self.objects.get(i))
    }

    /// Index of the first string object equal to `needle`
    #[must_use]
    pub fn position_of_string(&self, needle: &str) -> Option<u64> {
        self.objects
            .iter()
            .position(|object| object.as_string() == Some(needle))
            .map(|i| i as u64)
    }
}

/// Reference markers held directly as values of a dictionary object
///
/// Markers nested inside arrays (such as `NS.objects`) are not included.
#[must_use]
pub fn direct_references(object: &Value) -> Vec<u64> {
    match object {
        Value::Dictionary(dict) => dict
            .values()
            .filter_map(|value| match value {
                Value::Uid(uid) => Some(uid.get()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Highest direct reference of a dictionary object
#[must_use]
pub fn max_direct_reference(object: &Value) -> Option<u64> {
    direct_references(object).into_iter().max()
}
