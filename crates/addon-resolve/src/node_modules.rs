//! Nested `node_modules` lookup.

use std::path::{Path, PathBuf};

use crate::resolver::{ModuleResolver, ResolverOptions, is_package_name};

/// Resolves packages the way Node's module loader does on a physical
/// `node_modules` layout.
///
/// Starting at `start_dir` and moving to each ancestor, the first
/// `<dir>/node_modules/<package>/package.json` that exists wins. Directories
/// that are themselves `node_modules` folders are skipped. The returned path
/// has symlinks resolved, so linked workspace packages report their real
/// location.
#[derive(Debug, Clone, Default)]
pub struct NodeModulesResolver {
    options: ResolverOptions,
}

impl NodeModulesResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }
}

impl ModuleResolver for NodeModulesResolver {
    fn resolve_manifest(&self, package: &str, start_dir: &Path) -> Option<PathBuf> {
        if !is_package_name(package) {
            tracing::debug!(package, "Not a resolvable package name");
            return None;
        }

        let modules_dir = self.options.modules_dir.as_str();
        start_dir
            .ancestors()
            .filter(|dir| dir.file_name().is_none_or(|name| name != modules_dir))
            .map(|dir| {
                dir.join(modules_dir)
                    .join(package)
                    .join(&self.options.manifest_file)
            })
            .find(|candidate| candidate.is_file())
            .map(|found| dunce::canonicalize(&found).unwrap_or(found))
    }
}
