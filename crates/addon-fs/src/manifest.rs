//! Installed package manifest reading.
//!
//! Only the `version` field is extracted. Anything that prevents reading it
//! (missing file, unreadable file, malformed JSON, a non-string version)
//! yields `None`: a broken neighbouring package must never fail an
//! unrelated version check.

use std::path::Path;

use serde::Deserialize;

use crate::io;

/// The conventional manifest file name inside an installed package.
pub const MANIFEST_FILENAME: &str = "package.json";

/// The subset of an installed package manifest this crate looks at.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// Declared package version, if any.
    #[serde(default)]
    pub version: Option<String>,
}

impl PackageManifest {
    /// Parse manifest content.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}

/// Read the declared version from the manifest at `path`.
///
/// Returns `None` when the manifest is absent, unreadable, malformed, or
/// declares no version.
pub fn read_version(path: &Path) -> Option<String> {
    let content = match io::read_text(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Manifest not readable");
            return None;
        }
    };

    match PackageManifest::from_json(&content) {
        Ok(manifest) => manifest.version,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Manifest not parseable");
            None
        }
    }
}
