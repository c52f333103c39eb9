//! The addon tree as seen by the checker.
//!
//! The host build tool owns the tree; the checker only reads `name`,
//! `root`, `version`, and the ordered child `addons` of each node. Hosts
//! with their own node types implement [`AddonTree`]; [`AddonNode`] is an
//! owned implementation that can also be deserialized from the host's JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Read-only view of one node in an addon tree.
///
/// Node identity for uniqueness purposes is its install `root`, not its
/// name: two nodes named `bar` with different roots are two installs.
pub trait AddonTree {
    /// Package name. Not unique across a tree.
    fn name(&self) -> &str;

    /// Absolute install directory, absent for synthetic wrapper nodes.
    fn root(&self) -> Option<&Path>;

    /// The node's own declared package version.
    fn version(&self) -> Option<&str> {
        None
    }

    /// Child addons in declaration order.
    fn addons(&self) -> impl Iterator<Item = &Self>;
}

/// An owned addon tree node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonNode {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub addons: Vec<AddonNode>,
}

impl AddonNode {
    /// A leaf node installed at `root`.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: Some(root.into()),
            version: None,
            addons: Vec::new(),
        }
    }

    /// A node without an install root.
    pub fn rootless(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the declared version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Append a child addon.
    pub fn with_addon(mut self, addon: AddonNode) -> Self {
        self.addons.push(addon);
        self
    }

    /// Append a child addon and return it for further nesting.
    pub fn push_addon(&mut self, addon: AddonNode) -> &mut AddonNode {
        self.addons.push(addon);
        let last = self.addons.len() - 1;
        &mut self.addons[last]
    }
}

impl AddonTree for AddonNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn addons(&self) -> impl Iterator<Item = &Self> {
        self.addons.iter()
    }
}
