//! [`FixtureProject`] builder for nested install scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use addon_checker::AddonNode;
use tempfile::TempDir;

use crate::manifest::write_manifest;

/// A temporary project directory whose `node_modules` layout and addon tree
/// are built side by side.
///
/// Addons are addressed by the chain of addon names leading to them, so
/// `&["fake-addon", "bar"]` is the `bar` nested under `fake-addon`. Installing
/// under that chain writes to
/// `<root>/node_modules/fake-addon/node_modules/bar`.
///
/// # Example
///
/// ```rust,no_run
/// use addon_test_utils::FixtureProject;
///
/// let mut project = FixtureProject::new("rsvp", "3.1.4");
/// project.add_addon(&[], "bar", "3.0.0");
/// project.add_addon(&[], "fake-addon", "3.0.0");
/// project.add_addon(&["fake-addon"], "bar", "2.0.0");
/// assert_eq!(project.tree().addons.len(), 2);
/// ```
pub struct FixtureProject {
    temp_dir: TempDir,
    root: PathBuf,
    tree: AddonNode,
}

impl FixtureProject {
    /// Create a project directory with its own manifest.
    pub fn new(name: &str, version: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = dunce::canonicalize(temp_dir.path()).unwrap_or_else(|e| {
            panic!(
                "FixtureProject: failed to canonicalize {}: {e}",
                temp_dir.path().display()
            )
        });
        write_manifest(&root, name, Some(version));
        let tree = AddonNode::new(name, &root).with_version(version);
        Self {
            temp_dir,
            root,
            tree,
        }
    }

    /// Canonical project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a project-relative path.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn tree(&self) -> &AddonNode {
        &self.tree
    }

    pub fn temp_dir(&self) -> &TempDir {
        &self.temp_dir
    }

    /// Install directory for `name` below the addon at `parent`.
    pub fn install_dir(&self, parent: &[&str], name: &str) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in parent.iter().copied().chain(std::iter::once(name)) {
            dir = dir.join("node_modules").join(segment);
        }
        dir
    }

    /// Install a package on disk only; it does not appear in the tree.
    pub fn install(&self, parent: &[&str], name: &str, version: Option<&str>) -> PathBuf {
        let dir = self.install_dir(parent, name);
        write_manifest(&dir, name, version);
        dir
    }

    /// Install an addon on disk and append it to the tree under `parent`.
    ///
    /// # Panics
    /// Panics if `parent` does not name an existing addon chain.
    pub fn add_addon(&mut self, parent: &[&str], name: &str, version: &str) -> PathBuf {
        let dir = self.install(parent, name, Some(version));
        let node = AddonNode::new(name, &dir).with_version(version);
        self.node_mut(parent).push_addon(node);
        dir
    }

    /// Append a node to the tree without touching the disk.
    pub fn add_virtual_addon(&mut self, parent: &[&str], node: AddonNode) {
        self.node_mut(parent).push_addon(node);
    }

    /// Delete a project-relative directory tree.
    ///
    /// # Panics
    /// Panics if the directory cannot be removed.
    pub fn remove(&self, relative: &str) {
        let path = self.path(relative);
        fs::remove_dir_all(&path).unwrap_or_else(|e| {
            panic!("FixtureProject: failed to remove {}: {e}", path.display())
        });
    }

    fn node_mut(&mut self, chain: &[&str]) -> &mut AddonNode {
        let mut node = &mut self.tree;
        for segment in chain {
            node = node
                .addons
                .iter_mut()
                .rev()
                .find(|addon| addon.name == *segment)
                .unwrap_or_else(|| panic!("FixtureProject: no addon chain {chain:?}"));
        }
        node
    }
}
