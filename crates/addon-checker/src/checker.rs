//! The checker facade.
//!
//! A [`VersionChecker`] is bound to one project or addon. Single-package
//! queries resolve on disk relative to that node; tree-wide queries only
//! read the tree below it.

use std::collections::HashMap;
use std::path::Path;

use addon_resolve::PackageLocator;

use crate::check::{CheckResult, Requirements};
use crate::config::CheckerConfig;
use crate::dependency::{DependencyHandle, DependencyKind};
use crate::error::Result;
use crate::target::CheckTarget;
use crate::tree::{AddonNode, AddonTree};
use crate::uniqueness::{ImplementationReport, UniquenessAnalyzer};
use crate::walker::TreeWalker;

/// Version checks for one node of an addon tree.
///
/// ```no_run
/// use addon_checker::{AddonNode, VersionChecker};
///
/// let project = AddonNode::new("my-app", "/work/my-app");
/// let checker = VersionChecker::for_project(&project)?;
///
/// if checker.for_package("ember-source").gte("3.28.0") {
///     // modern code path
/// }
/// checker.assert_single_implementation("ember-auto-import", None)?;
/// # Ok::<(), addon_checker::Error>(())
/// ```
#[derive(Debug)]
pub struct VersionChecker<'t, N = AddonNode> {
    target: CheckTarget<'t, N>,
    locator: PackageLocator,
    analyzer: UniquenessAnalyzer<'t, N>,
    requirements: Requirements,
}

impl<'t, N: AddonTree> VersionChecker<'t, N> {
    pub fn new(target: CheckTarget<'t, N>) -> Self {
        tracing::debug!(
            node = target.node().name(),
            shape = ?target.shape(),
            base = %target.resolution_base().display(),
            "Created version checker"
        );
        Self {
            analyzer: UniquenessAnalyzer::new(target.node()),
            target,
            locator: PackageLocator::default(),
            requirements: Requirements::new(),
        }
    }

    /// Checker for the project at the root of a tree.
    pub fn for_project(project: &'t N) -> Result<Self> {
        Ok(Self::new(CheckTarget::project(project)?))
    }

    /// Checker for an addon owned by the project rooted at `project_root`.
    pub fn for_addon(addon: &'t N, project_root: Option<&Path>) -> Result<Self> {
        Ok(Self::new(CheckTarget::addon(addon, project_root)?))
    }

    /// Replace the package lookup strategy.
    pub fn with_locator(mut self, locator: PackageLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Apply layout conventions and configured requirements.
    pub fn with_config(mut self, config: &CheckerConfig) -> Self {
        self.locator = PackageLocator::with_options(config.resolution.clone());
        self.requirements = config.requirements.clone();
        self
    }

    pub fn target(&self) -> &CheckTarget<'t, N> {
        &self.target
    }

    pub fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    /// Handle for npm package `name` as installed for this node.
    ///
    /// Nothing is resolved until the handle's version is first needed.
    pub fn for_package(&self, name: &str) -> DependencyHandle {
        self.handle(name, DependencyKind::Npm, self.target.resolution_base())
    }

    /// Handle for `name` resolved the way `kind` prescribes.
    pub fn for_package_kind(&self, name: &str, kind: DependencyKind) -> Result<DependencyHandle> {
        let base_dir = self.target.base_dir(kind)?;
        Ok(self.handle(name, kind, base_dir))
    }

    fn handle(&self, name: &str, kind: DependencyKind, base_dir: &Path) -> DependencyHandle {
        DependencyHandle::new(
            name,
            self.target.node().name(),
            kind,
            base_dir,
            self.locator.clone(),
        )
    }

    fn walker(&self) -> TreeWalker<'t, N> {
        TreeWalker::new(self.target.node())
    }

    /// Every addon below this node, depth first.
    pub fn all_addons(&self) -> Vec<&'t N> {
        self.walker().all_addons()
    }

    pub fn filter_addons_by_name(&self, name: &str) -> Vec<&'t N> {
        self.walker().filter_by_name(name)
    }

    /// Matches for several names from a single walk.
    pub fn filter_addons_by_names<S: AsRef<str>>(&self, names: &[S]) -> HashMap<String, Vec<&'t N>> {
        self.walker().filter_by_names(names)
    }

    pub fn has_single_implementation(&self, name: &str) -> bool {
        self.analyzer.has_single_implementation(name)
    }

    pub fn assert_single_implementation(&self, name: &str, message: Option<&str>) -> Result<()> {
        self.analyzer.assert_single_implementation(name, message)
    }

    pub fn implementation_report(&self, name: &str) -> ImplementationReport {
        self.analyzer.report(name)
    }

    /// Forget memoized single-implementation verdicts.
    pub fn clear_cache(&self) {
        self.analyzer.cache().clear();
    }

    /// Check that every installed copy of each package satisfies its range.
    pub fn check(&self, requirements: &Requirements) -> CheckResult {
        let matches = self.filter_addons_by_names(&requirements.names());
        let result = CheckResult::evaluate(requirements, &matches);
        tracing::debug!(
            requirements = requirements.len(),
            satisfied = result.is_satisfied,
            "Checked requirements"
        );
        result
    }

    /// [`check`](Self::check) against the configured requirements.
    pub fn check_configured(&self) -> CheckResult {
        self.check(&self.requirements)
    }
}
