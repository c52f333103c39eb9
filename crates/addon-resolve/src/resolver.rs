//! The module resolution seam.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Strategy that finds an installed package's manifest.
///
/// Implementations answer "which copy of `package` would be loaded by code
/// living in `start_dir`", following the layout rules of one package
/// manager. Not finding the package is an expected outcome and is reported
/// as `None`.
pub trait ModuleResolver: fmt::Debug + Send + Sync {
    /// Absolute path of the manifest of `package` as seen from `start_dir`.
    fn resolve_manifest(&self, package: &str, start_dir: &Path) -> Option<PathBuf>;
}

/// Layout conventions shared by the bundled resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Manifest file name inside an installed package.
    pub manifest_file: String,
    /// Name of the per-directory install folder.
    pub modules_dir: String,
    /// Name of the Plug'n'Play data file at a project root.
    pub pnp_data_file: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            manifest_file: addon_fs::MANIFEST_FILENAME.to_string(),
            modules_dir: "node_modules".to_string(),
            pnp_data_file: ".pnp.data.json".to_string(),
        }
    }
}

/// Whether `name` is usable as a package name in a path lookup.
///
/// Accepts `name` and `@scope/name`; rejects anything that could escape
/// the install folder.
pub fn is_package_name(name: &str) -> bool {
    let valid_segment = |segment: &str| {
        !segment.is_empty()
            && !segment.starts_with('.')
            && !segment.contains(['\\', ':', '\0'])
    };

    match name.split_once('/') {
        Some((scope, rest)) => {
            scope.len() > 1
                && scope.starts_with('@')
                && valid_segment(&scope[1..])
                && !rest.contains('/')
                && valid_segment(rest)
        }
        None => !name.starts_with('@') && valid_segment(name),
    }
}
