//! Package locator

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::auto::AutoResolver;
use crate::resolver::{ModuleResolver, ResolverOptions};

/// Finds a package's installed manifest relative to a starting directory.
///
/// Cheap to clone; the resolution strategy is shared.
#[derive(Debug, Clone)]
pub struct PackageLocator {
    resolver: Arc<dyn ModuleResolver>,
}

impl PackageLocator {
    /// Locator using `resolver` as its resolution strategy.
    pub fn new(resolver: impl ModuleResolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Locator sharing an existing resolution strategy.
    pub fn from_shared(resolver: Arc<dyn ModuleResolver>) -> Self {
        Self { resolver }
    }

    /// Auto-detecting locator honoring custom layout conventions.
    pub fn with_options(options: ResolverOptions) -> Self {
        Self::new(AutoResolver::with_options(options))
    }

    /// Absolute path of `package`'s manifest as seen from `start_dir`, or
    /// `None` when it is not installed there.
    pub fn locate(&self, package: &str, start_dir: &Path) -> Option<PathBuf> {
        let found = self.resolver.resolve_manifest(package, start_dir);
        match &found {
            Some(path) => tracing::debug!(
                package,
                start_dir = %start_dir.display(),
                manifest = %path.display(),
                "Located package"
            ),
            None => tracing::debug!(package, start_dir = %start_dir.display(), "Package not found"),
        }
        found
    }
}

impl Default for PackageLocator {
    fn default() -> Self {
        Self::new(AutoResolver::new())
    }
}
