//! One dependency as seen from one tree node.
//!
//! A [`DependencyHandle`] locates the package's manifest and reads its
//! version lazily, at most once each, no matter how many predicates are
//! asked. A missing package is a `None` version: every predicate is `false`
//! for it except [`DependencyHandle::neq`], since nothing is trivially not
//! equal to anything.

use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use addon_resolve::PackageLocator;
use semver::Version;

use crate::error::{Error, Result};
use crate::range::{VersionRange, parse_version};

/// How a dependency is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DependencyKind {
    /// From the node's own install root, falling back to the project root.
    #[default]
    Npm,
    /// From the project root, regardless of the node's own root.
    ProjectNpm,
    /// Legacy Bower components. Rejected.
    Bower,
}

impl DependencyKind {
    /// Package manager name used in messages.
    pub fn package_manager(&self) -> &'static str {
        match self {
            Self::Npm | Self::ProjectNpm => "npm",
            Self::Bower => "bower",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Npm => "npm",
            Self::ProjectNpm => "projectNpm",
            Self::Bower => "bower",
        })
    }
}

impl FromStr for DependencyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "npm" => Ok(Self::Npm),
            "projectNpm" => Ok(Self::ProjectNpm),
            "bower" => Ok(Self::Bower),
            other => Err(Error::UnsupportedKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// Package `name` as seen from one node of the tree.
#[derive(Debug)]
pub struct DependencyHandle {
    name: String,
    owner: String,
    kind: DependencyKind,
    base_dir: PathBuf,
    locator: PackageLocator,
    manifest_path: OnceCell<Option<PathBuf>>,
    version: OnceCell<Option<String>>,
}

impl DependencyHandle {
    pub(crate) fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
        kind: DependencyKind,
        base_dir: impl Into<PathBuf>,
        locator: PackageLocator,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            kind,
            base_dir: base_dir.into(),
            locator,
            manifest_path: OnceCell::new(),
            version: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    /// Directory the lookup starts from.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Manifest of the installed package, located on first access.
    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path
            .get_or_init(|| self.locator.locate(&self.name, &self.base_dir))
            .as_deref()
    }

    /// Installed version, read on first access.
    pub fn version(&self) -> Option<&str> {
        self.version
            .get_or_init(|| {
                let version = self.manifest_path().and_then(addon_fs::read_version);
                tracing::debug!(
                    package = %self.name,
                    owner = %self.owner,
                    version = version.as_deref().unwrap_or("none"),
                    "Resolved dependency version"
                );
                version
            })
            .as_deref()
    }

    /// Whether an installed version was found.
    pub fn exists(&self) -> bool {
        self.version().is_some()
    }

    pub fn gt(&self, version: &str) -> bool {
        self.compare(version, |installed, other| installed > other)
    }

    pub fn lt(&self, version: &str) -> bool {
        self.compare(version, |installed, other| installed < other)
    }

    pub fn gte(&self, version: &str) -> bool {
        self.compare(version, |installed, other| installed >= other)
    }

    pub fn lte(&self, version: &str) -> bool {
        self.compare(version, |installed, other| installed <= other)
    }

    pub fn eq(&self, version: &str) -> bool {
        self.compare(version, |installed, other| installed == other)
    }

    /// `true` when the dependency is missing.
    pub fn neq(&self, version: &str) -> bool {
        if self.version().is_none() {
            return true;
        }
        self.compare(version, |installed, other| installed != other)
    }

    /// Whether the installed version is inside `range`. An unparseable
    /// range is treated as unsatisfied.
    pub fn satisfies(&self, range: &str) -> bool {
        let Some(installed) = self.version() else {
            return false;
        };
        match VersionRange::parse(range) {
            Ok(range) => range.satisfies(installed),
            Err(e) => {
                tracing::warn!(package = %self.name, "{}", e);
                false
            }
        }
    }

    /// Alias for [`gt`](Self::gt).
    pub fn is_above(&self, version: &str) -> bool {
        self.gt(version)
    }

    /// Fail unless the installed version is above `version`.
    pub fn assert_above(&self, version: &str, message: Option<&str>) -> Result<()> {
        if self.is_above(version) {
            return Ok(());
        }

        let message = match message {
            Some(message) => message.to_string(),
            None => format!(
                "The addon `{}` requires the {} package `{}` to be above {}, but you have {}.",
                self.owner,
                self.kind.package_manager(),
                self.name,
                version,
                self.version().unwrap_or("null")
            ),
        };
        Err(Error::assertion(message))
    }

    fn compare(&self, other: &str, predicate: impl FnOnce(&Version, &Version) -> bool) -> bool {
        let Some(installed) = self.version() else {
            return false;
        };
        match (parse_version(installed), parse_version(other)) {
            (Some(installed), Some(other)) => predicate(&installed, &other),
            (None, _) => {
                tracing::warn!(package = %self.name, version = installed, "Installed version is not valid semver");
                false
            }
            (_, None) => {
                tracing::warn!(package = %self.name, version = other, "Comparison version is not valid semver");
                false
            }
        }
    }
}
