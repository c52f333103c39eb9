//! Dependency version checks for addon trees.
//!
//! Bind a [`VersionChecker`] to a project or addon, then ask about the
//! packages installed for it (`for_package("x").gte("2.0.0")`) or about the
//! whole tree below it (`assert_single_implementation("x")`, `check`).
//! Only policy violations fail loudly; a missing or unreadable package is
//! an ordinary answer.

pub mod check;
pub mod checker;
pub mod config;
pub mod dependency;
pub mod error;
pub mod range;
pub mod target;
pub mod tree;
pub mod uniqueness;
pub mod walker;

pub use check::{CheckResult, PackageCheck, Requirement, Requirements};
pub use checker::VersionChecker;
pub use config::CheckerConfig;
pub use dependency::{DependencyHandle, DependencyKind};
pub use error::{Error, Result};
pub use range::{VersionRange, parse_version};
pub use target::{CheckTarget, HostTarget, TargetShape};
pub use tree::{AddonNode, AddonTree};
pub use uniqueness::{ImplementationReport, UniquenessAnalyzer, UniquenessCache};
pub use walker::TreeWalker;

pub use addon_resolve::{ModuleResolver, PackageLocator, ResolverOptions};
