//! Layout auto-detection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::node_modules::NodeModulesResolver;
use crate::pnp::PnpResolver;
use crate::resolver::{ModuleResolver, ResolverOptions};

/// Default resolver: Plug'n'Play when the lookup happens inside a project
/// that has a PnP data file, `node_modules` lookup otherwise.
///
/// Parsed data files are memoized per path for the lifetime of the
/// resolver. A data file that fails to parse is logged once and the
/// project is treated as a `node_modules` install.
///
/// Only the standalone data file (`pnp_data_file`) is detected. Yarn inlines
/// the same data into `.pnp.cjs` (`.pnp.js` for Yarn 1) unless
/// `pnpEnableInlining: false` is set; such projects are not recognized and
/// resolve through `node_modules`, where their packages are not found.
#[derive(Debug, Default)]
pub struct AutoResolver {
    node_modules: NodeModulesResolver,
    pnp: Mutex<HashMap<PathBuf, Option<Arc<PnpResolver>>>>,
}

impl AutoResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ResolverOptions) -> Self {
        Self {
            node_modules: NodeModulesResolver::with_options(options),
            pnp: Mutex::default(),
        }
    }

    fn pnp_for(&self, start_dir: &Path) -> Option<Arc<PnpResolver>> {
        let options = self.node_modules.options();
        let data_file = addon_fs::io::find_upwards(start_dir, &options.pnp_data_file)?;

        let mut cache = self.pnp.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache
            .entry(data_file.clone())
            .or_insert_with(|| match PnpResolver::load(&data_file, options.clone()) {
                Ok(resolver) => Some(Arc::new(resolver)),
                Err(e) => {
                    tracing::warn!("Ignoring unusable Plug'n'Play data: {}", e);
                    None
                }
            })
            .clone()
    }
}

impl ModuleResolver for AutoResolver {
    fn resolve_manifest(&self, package: &str, start_dir: &Path) -> Option<PathBuf> {
        match self.pnp_for(start_dir) {
            Some(pnp) => pnp.resolve_manifest(package, start_dir),
            None => self.node_modules.resolve_manifest(package, start_dir),
        }
    }
}
