//! Package location for the addon version checker.
//!
//! Given a package name and the directory a lookup starts from, find the
//! manifest of the copy of that package the host package manager would load
//! from there. Nested installs shadow hoisted ones, so the start directory
//! matters: resolving everything from the project root would hide exactly
//! the duplicates the checker looks for.

pub mod auto;
pub mod error;
pub mod locator;
pub mod node_modules;
pub mod pnp;
pub mod resolver;

pub use auto::AutoResolver;
pub use error::{Error, Result};
pub use locator::PackageLocator;
pub use node_modules::NodeModulesResolver;
pub use pnp::PnpResolver;
pub use resolver::{ModuleResolver, ResolverOptions, is_package_name};
