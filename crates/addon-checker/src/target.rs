//! What a checker is bound to, and where its lookups start.
//!
//! A check target is either a project (the tree root, resolving from its
//! own root) or an addon somewhere in the tree (resolving from its own
//! install root when it has one, otherwise from its project's root). The
//! precedence is fixed at construction; a target that has no usable base
//! directory is rejected there.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::dependency::DependencyKind;
use crate::error::{Error, Result};
use crate::tree::{AddonNode, AddonTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    Project,
    Addon,
}

/// A validated node plus its resolution base.
#[derive(Debug)]
pub struct CheckTarget<'t, N> {
    node: &'t N,
    shape: TargetShape,
    base: PathBuf,
    project_root: Option<PathBuf>,
}

impl<'t, N: AddonTree> CheckTarget<'t, N> {
    /// The project at the root of the tree. It must have a root directory.
    pub fn project(project: &'t N) -> Result<Self> {
        let root = non_empty(project.root())
            .ok_or_else(|| Error::invalid_target("a project must have a root directory"))?;
        Ok(Self {
            node: project,
            shape: TargetShape::Project,
            base: root.to_path_buf(),
            project_root: Some(root.to_path_buf()),
        })
    }

    /// An addon, with the root of the project that owns it.
    pub fn addon(addon: &'t N, project_root: Option<&Path>) -> Result<Self> {
        let project_root = non_empty(project_root).map(Path::to_path_buf);
        let base = non_empty(addon.root())
            .map(Path::to_path_buf)
            .or_else(|| project_root.clone())
            .ok_or_else(|| {
                Error::invalid_target(format!(
                    "addon '{}' has no root and no project root to fall back to",
                    addon.name()
                ))
            })?;
        Ok(Self {
            node: addon,
            shape: TargetShape::Addon,
            base,
            project_root,
        })
    }

    pub fn node(&self) -> &'t N {
        self.node
    }

    pub fn shape(&self) -> TargetShape {
        self.shape
    }

    /// Where npm lookups start: the node's own root, else the project root.
    pub fn resolution_base(&self) -> &Path {
        &self.base
    }

    /// Directory a lookup of the given kind starts from.
    pub fn base_dir(&self, kind: DependencyKind) -> Result<&Path> {
        match kind {
            DependencyKind::Npm => Ok(&self.base),
            DependencyKind::ProjectNpm => Ok(self.project_root.as_deref().unwrap_or(&self.base)),
            DependencyKind::Bower => Err(Error::UnsupportedKind {
                kind: "Bower".to_string(),
            }),
        }
    }
}

/// A target decoded from the host's raw JSON shape.
///
/// Projects look like `{ "root": ..., "addons": [...] }`, addons like
/// `{ "name": ..., "root": ..., "project": { "root": ... } }`.
#[derive(Debug, Clone)]
pub struct HostTarget {
    shape: TargetShape,
    node: AddonNode,
    project_root: Option<PathBuf>,
}

impl HostTarget {
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(Error::invalid_target(format!(
                "expected an object, got {}",
                describe(value)
            )));
        };

        let node: AddonNode = serde_json::from_value(value.clone())
            .map_err(|e| Error::invalid_target(e.to_string()))?;

        if let Some(project) = fields.get("project") {
            let project_root = project
                .get("root")
                .and_then(Value::as_str)
                .filter(|root| !root.is_empty())
                .map(PathBuf::from);
            let target = Self {
                shape: TargetShape::Addon,
                node,
                project_root,
            };
            target.target()?;
            return Ok(target);
        }

        let has_root = fields
            .get("root")
            .and_then(Value::as_str)
            .is_some_and(|root| !root.is_empty());
        if has_root {
            if fields.get("addonsInitialized").and_then(Value::as_bool) == Some(false) {
                return Err(Error::invalid_target(
                    "the project's addons have not been initialized",
                ));
            }
            let project_root = node.root.clone();
            return Ok(Self {
                shape: TargetShape::Project,
                node,
                project_root,
            });
        }

        Err(Error::invalid_target(
            "neither a project root nor an owning project was given",
        ))
    }

    pub fn shape(&self) -> TargetShape {
        self.shape
    }

    pub fn node(&self) -> &AddonNode {
        &self.node
    }

    /// Borrow as a check target.
    pub fn target(&self) -> Result<CheckTarget<'_, AddonNode>> {
        match self.shape {
            TargetShape::Project => CheckTarget::project(&self.node),
            TargetShape::Addon => CheckTarget::addon(&self.node, self.project_root.as_deref()),
        }
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|path| !path.as_os_str().is_empty())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
