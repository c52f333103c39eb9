//! Checker configuration
//!
//! ```toml
//! manifest_file = "package.json"
//! modules_dir = "node_modules"
//! pnp_data_file = ".pnp.data.json"
//!
//! [requirements]
//! ember-source = ">= 3.28.0"
//! ember-auto-import = "^2.0.0"
//! ```

use std::path::Path;

use addon_fs::ConfigStore;
use addon_resolve::ResolverOptions;
use serde::Deserialize;

use crate::check::Requirements;
use crate::error::{Error, Result};
use crate::range::VersionRange;

/// Layout conventions plus the requirements `check_configured` enforces.
/// Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    #[serde(flatten)]
    pub resolution: ResolverOptions,
    pub requirements: Requirements,
}

impl CheckerConfig {
    /// Load from a `.toml`, `.json`, `.yaml` or `.yml` file.
    ///
    /// Requirement ranges are validated eagerly so a typo surfaces at load
    /// time rather than as a failed check.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = ConfigStore::new().load(path)?;
        config.validate(path)?;
        tracing::debug!(
            path = %path.display(),
            requirements = config.requirements.len(),
            "Loaded checker config"
        );
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        for requirement in self.requirements.iter() {
            VersionRange::parse(&requirement.range)?;
        }
        if self.resolution.manifest_file.is_empty() || self.resolution.modules_dir.is_empty() {
            return Err(Error::Config(addon_fs::Error::ConfigParse {
                path: path.to_path_buf(),
                format: "checker".into(),
                message: "manifest_file and modules_dir must not be empty".into(),
            }));
        }
        Ok(())
    }
}
