//! Error types for preset patching
//!
//! Every fault aborts the run; a partially patched preset is never written.

use btt_graph::{AppIdentity, CodecError, GraftError};
use std::path::PathBuf;

/// Errors reading or writing the configuration document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Document is not valid JSON
    #[error("invalid preset json: {0}")]
    Json(#[from] serde_json::Error),

    /// Root key holding the app entries is absent
    #[error("BTTPresetContent not present at the root level - invalid preset")]
    MissingPresetContent,
}

/// Errors while cloning an app entry
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// Source entry is not a JSON object
    #[error("app entry is not a JSON object")]
    NotAnObject,

    /// A `BTTUUID` field holds something other than a string
    #[error("key BTTUUID should be of type string, found {found}")]
    UuidNotString {
        /// JSON type actually found
        found: &'static str,
    },
}

/// Errors loading a patch profile
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Profile file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// Profile path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Profile is not valid TOML for this schema
    #[error("invalid profile: {0}")]
    Toml(#[from] toml::de::Error),

    /// Clone rule without targets
    #[error("clone rule for {0} has no targets")]
    NoTargets(AppIdentity),

    /// Clone rule targeting its own source
    #[error("clone rule for {0} targets itself")]
    SelfTarget(AppIdentity),

    /// Two clone rules share a source
    #[error("duplicate clone rule for {0}")]
    DuplicateSource(AppIdentity),

    /// Unsupported-app marker is empty and would match every entry
    #[error("unsupported_app_marker must not be empty")]
    EmptyMarker,
}

/// Errors from the patch pass over a document
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// Document shape is invalid
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Profile failed validation
    #[error("invalid profile: {0}")]
    Profile(#[from] ProfileError),

    /// Cloning an entry failed
    #[error("cloning {from} as {to} failed: {source}")]
    CloneFailed {
        /// Source identity
        from: AppIdentity,
        /// Target identity
        to: AppIdentity,
        /// Underlying error
        #[source]
        source: CloneError,
    },

    /// Activation group condition could not be decoded or encoded
    #[error("activation group condition of '{app}': {source}")]
    Condition {
        /// App entry holding the condition
        app: String,
        /// Underlying error
        #[source]
        source: CodecError,
    },

    /// Grafting clones into a condition failed
    #[error("grafting {source_app} into '{app}' failed: {source}")]
    Graft {
        /// App entry holding the condition
        app: String,
        /// Clone source being grafted
        source_app: AppIdentity,
        /// Underlying error
        #[source]
        source: GraftError,
    },

    /// Configured clone sources never seen in the document
    #[error("failed to find source config for {}", join_identities(.missing))]
    SourceNotFound {
        /// Sources that were never matched
        missing: Vec<AppIdentity>,
    },
}

/// Errors reading or writing a preset archive
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Archive file could not be read or written
    #[error("io error on {path}: {source}")]
    Io {
        /// Archive path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Archive is not a readable zip
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Archive lacks the configuration entry
    #[error("archive has no '{0}' entry")]
    MissingEntry(&'static str),

    /// Reading or writing an entry failed
    #[error("entry io error: {0}")]
    Entry(#[from] std::io::Error),

    /// Configuration entry is invalid
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Errors from patching a preset file end to end
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    /// Archive level failure
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Patch pass failure
    #[error("patch error: {0}")]
    Patch(#[from] PatchError),
}

impl ArchiveError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl PatchError {
    /// Whether this is the terminal missing-source check
    #[inline]
    #[must_use]
    pub fn is_source_not_found(&self) -> bool {
        matches!(self, Self::SourceNotFound { .. })
    }
}

fn join_identities(identities: &[AppIdentity]) -> String {
    identities
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
