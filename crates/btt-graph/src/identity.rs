//! Application identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// A (bundle identifier, display name) pair naming one application
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppIdentity {
    /// Bundle identifier, e.g. `com.microsoft.VSCode`
    pub bundle_id: String,
    /// Display name, e.g. `Visual Studio Code`
    pub name: String,
}

impl AppIdentity {
    /// Create identity from bundle identifier and display name
    #[inline]
    #[must_use]
    pub fn new(bundle_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.bundle_id)
    }
}
