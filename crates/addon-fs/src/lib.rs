//! Filesystem access for the addon version checker
//!
//! Reads installed package manifests and loads checker configuration files.

pub mod config;
pub mod error;
pub mod io;
pub mod manifest;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use manifest::{MANIFEST_FILENAME, PackageManifest, read_version};
