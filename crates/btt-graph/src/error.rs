//! Error types for condition decoding and graph surgery

use crate::identity::AppIdentity;

/// Errors while locating or grafting a predicate subgraph
#[derive(Debug, thiserror::Error)]
pub enum GraftError {
    /// Neither the bundle identifier nor the display name is in the object table
    #[error("neither '{}' nor '{}' appears in the object table", .source_app.bundle_id, .source_app.name)]
    MarkerNotFound {
        /// Application whose predicate was searched for
        source_app: AppIdentity,
    },

    /// A reference marker points past the end of the object table
    #[error("reference {index} points past the end of the object table ({len} objects)")]
    DanglingReference {
        /// Referenced index
        index: u64,
        /// Length of the object table
        len: usize,
    },

    /// No `NS.objects` list holds the root of the predicate subgraph
    #[error("could not locate root level list referencing object {copy_from}")]
    RootListNotFound {
        /// First index of the copied predicate range
        copy_from: u64,
    },
}

/// Errors while decoding or encoding an activation group condition
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Condition text is not base64
    #[error("condition is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are not a property list, or re-encoding failed
    #[error("property list error: {0}")]
    Plist(#[from] plist::Error),

    /// Property list root is not a dictionary
    #[error("archive root is not a dictionary")]
    NotAnArchive,

    /// Archive has no `$objects` array
    #[error("archive has no $objects array")]
    MissingObjects,

    /// Condition field holds something other than text
    #[error("condition should be a base64 string, found {found}")]
    NotAString {
        /// Type actually found
        found: &'static str,
    },
}
