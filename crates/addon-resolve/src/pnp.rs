//! Yarn Plug'n'Play resolution.
//!
//! Plug'n'Play installs have no `node_modules` tree. Instead a data file at
//! the project root (`.pnp.data.json`) lists every package instance, where
//! it lives, and which instance each of its dependencies maps to:
//!
//! ```json
//! {
//!   "enableTopLevelFallback": true,
//!   "packageRegistryData": [
//!     [null, [[null, {"packageLocation": "./", "packageDependencies": [["bar", "npm:2.0.0"]]}]]],
//!     ["bar", [["npm:2.0.0", {"packageLocation": "./.yarn/unplugged/bar-npm-2.0.0/node_modules/bar/", "packageDependencies": []}]]]
//!   ]
//! }
//! ```
//!
//! Package instances stored inside zip archives resolve to a manifest path
//! that cannot be read from disk; such packages read as having no version.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::resolver::{ModuleResolver, ResolverOptions, is_package_name};

type Locator = (Option<String>, Option<String>);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PnpData {
    #[serde(default)]
    enable_top_level_fallback: bool,
    #[serde(default)]
    fallback_exclusion_list: Vec<(String, Vec<String>)>,
    package_registry_data: Vec<(Option<String>, Vec<(Option<String>, PackageInformation)>)>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageInformation {
    package_location: String,
    #[serde(default)]
    package_dependencies: Vec<(String, Option<DependencyTarget>)>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DependencyTarget {
    Reference(String),
    Aliased(String, String),
}

#[derive(Debug)]
struct PackageEntry {
    location: PathBuf,
    /// `None` marks a declared but unfulfilled (peer) dependency.
    dependencies: HashMap<String, Option<(String, String)>>,
}

/// Resolver backed by one project's Plug'n'Play data file.
///
/// Reads the JSON data file only. Data inlined into a `.pnp.cjs` or
/// `.pnp.js` loader is not parsed; generate the standalone file with
/// `pnpEnableInlining: false`.
#[derive(Debug)]
pub struct PnpResolver {
    data_file: PathBuf,
    packages: HashMap<Locator, PackageEntry>,
    top_level_fallback: bool,
    fallback_exclusions: HashSet<Locator>,
    options: ResolverOptions,
}

impl PnpResolver {
    /// Load the data file at `data_file`.
    ///
    /// Package locations inside it are relative to the directory that
    /// contains the file.
    pub fn load(data_file: &Path, options: ResolverOptions) -> Result<Self> {
        let content = addon_fs::io::read_text(data_file)?;
        Self::from_json(&content, data_file, options)
    }

    /// Parse Plug'n'Play data that was read from `data_file`.
    pub fn from_json(content: &str, data_file: &Path, options: ResolverOptions) -> Result<Self> {
        let data: PnpData = serde_json::from_str(content).map_err(|e| Error::PnpData {
            path: data_file.to_path_buf(),
            message: e.to_string(),
        })?;

        let base_dir = data_file
            .parent()
            .map(|dir| dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf()))
            .unwrap_or_default();

        let mut packages = HashMap::new();
        for (name, instances) in data.package_registry_data {
            for (reference, info) in instances {
                let dependencies = info
                    .package_dependencies
                    .into_iter()
                    .map(|(dependency, target)| {
                        let resolved = target.map(|target| match target {
                            DependencyTarget::Reference(reference) => {
                                (dependency.clone(), reference)
                            }
                            DependencyTarget::Aliased(alias, reference) => (alias, reference),
                        });
                        (dependency, resolved)
                    })
                    .collect();

                packages.insert(
                    (name.clone(), reference),
                    PackageEntry {
                        location: normalize_lexically(&base_dir.join(&info.package_location)),
                        dependencies,
                    },
                );
            }
        }

        let fallback_exclusions = data
            .fallback_exclusion_list
            .into_iter()
            .flat_map(|(name, references)| {
                references
                    .into_iter()
                    .map(move |reference| (Some(name.clone()), Some(reference)))
            })
            .collect();

        tracing::debug!(
            data_file = %data_file.display(),
            packages = packages.len(),
            "Loaded Plug'n'Play data"
        );

        Ok(Self {
            data_file: data_file.to_path_buf(),
            packages,
            top_level_fallback: data.enable_top_level_fallback,
            fallback_exclusions,
            options,
        })
    }

    /// Path of the data file this resolver was built from.
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// The package instance whose location contains `dir`, preferring the
    /// most deeply nested one.
    fn find_issuer(&self, dir: &Path) -> Option<&Locator> {
        let dir = normalize_lexically(&dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf()));
        self.packages
            .iter()
            .filter(|(_, entry)| dir.starts_with(&entry.location))
            .max_by_key(|(_, entry)| entry.location.components().count())
            .map(|(locator, _)| locator)
    }

    fn dependency_of(&self, issuer: &Locator, package: &str) -> Option<Option<&(String, String)>> {
        self.packages
            .get(issuer)?
            .dependencies
            .get(package)
            .map(Option::as_ref)
    }
}

impl ModuleResolver for PnpResolver {
    fn resolve_manifest(&self, package: &str, start_dir: &Path) -> Option<PathBuf> {
        if !is_package_name(package) {
            return None;
        }

        let top_level: Locator = (None, None);
        let issuer = self.find_issuer(start_dir).unwrap_or(&top_level);

        let target = match self.dependency_of(issuer, package) {
            Some(declared) => declared,
            None if self.top_level_fallback && !self.fallback_exclusions.contains(issuer) => {
                self.dependency_of(&top_level, package).flatten()
            }
            None => None,
        };

        let Some((name, reference)) = target else {
            tracing::debug!(package, issuer = ?issuer, "Not a dependency in Plug'n'Play data");
            return None;
        };

        let entry = self
            .packages
            .get(&(Some(name.clone()), Some(reference.clone())))?;
        Some(entry.location.join(&self.options.manifest_file))
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
