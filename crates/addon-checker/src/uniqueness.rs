//! Single-implementation analysis.
//!
//! A package has a single implementation in a tree when every node named
//! after it shares one install root. No match at all is reported
//! separately; it is not a single implementation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::ops::ControlFlow;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::tree::AddonTree;
use crate::walker::TreeWalker;

/// Every distinct install of one package in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImplementationReport {
    pub name: String,
    /// Number of matching nodes.
    pub matches: usize,
    /// Distinct install roots, in the order first encountered.
    pub roots: Vec<Option<PathBuf>>,
}

impl ImplementationReport {
    /// Build a report from a walk's matches.
    pub fn from_matches<N: AddonTree>(name: impl Into<String>, matches: &[&N]) -> Self {
        let mut roots: Vec<Option<PathBuf>> = Vec::new();
        for node in matches {
            let root = node.root().map(PathBuf::from);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        Self {
            name: name.into(),
            matches: matches.len(),
            roots,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.matches == 0
    }

    pub fn is_single(&self) -> bool {
        self.roots.len() == 1
    }

    /// The diagnostic for a missing or duplicated package, `None` when the
    /// package has a single implementation.
    pub fn failure_message(&self) -> Option<String> {
        let name = &self.name;
        if self.is_missing() {
            return Some(format!(
                "This project requires a single implementation version of the npm package '{name}', but none where found."
            ));
        }
        if self.is_single() {
            return None;
        }

        let mut message = format!(
            "This project requires a single implementation version of the npm package '{name}', but there're multiple. Please resolve '{name}' to same version."
        );
        for root in &self.roots {
            let root = root
                .as_ref()
                .map(|root| root.display().to_string())
                .unwrap_or_else(|| "<no root>".to_string());
            let _ = write!(message, "\n - {name} @ {root}");
        }
        Some(message)
    }
}

/// Memoized single-implementation verdicts, per package name.
#[derive(Debug, Default)]
pub struct UniquenessCache {
    verdicts: RefCell<HashMap<String, bool>>,
}

impl UniquenessCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, name: &str) -> Option<bool> {
        self.verdicts.borrow().get(name).copied()
    }

    fn insert(&self, name: &str, verdict: bool) {
        self.verdicts.borrow_mut().insert(name.to_string(), verdict);
    }

    /// Forget every verdict.
    pub fn clear(&self) {
        self.verdicts.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.verdicts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.borrow().is_empty()
    }
}

/// Answers single-implementation questions about one tree.
///
/// The analyzer borrows the tree for as long as it lives, so the tree
/// cannot change underneath its cache. Reusing verdicts across a tree
/// mutation requires dropping the analyzer first.
#[derive(Debug)]
pub struct UniquenessAnalyzer<'t, N> {
    walker: TreeWalker<'t, N>,
    cache: UniquenessCache,
}

impl<'t, N: AddonTree> UniquenessAnalyzer<'t, N> {
    pub fn new(root: &'t N) -> Self {
        Self {
            walker: TreeWalker::new(root),
            cache: UniquenessCache::new(),
        }
    }

    pub fn cache(&self) -> &UniquenessCache {
        &self.cache
    }

    /// Full report for `name`.
    pub fn report(&self, name: &str) -> ImplementationReport {
        ImplementationReport::from_matches(name, &self.walker.filter_by_name(name))
    }

    /// Whether exactly one install root exists for `name`.
    ///
    /// Stops walking as soon as a second root shows up.
    pub fn has_single_implementation(&self, name: &str) -> bool {
        if let Some(verdict) = self.cache.get(name) {
            return verdict;
        }

        let mut first_root = None;
        let duplicated = self.walker.try_for_each(|node| {
            if node.name() != name {
                return ControlFlow::Continue(());
            }
            match first_root {
                None => {
                    first_root = Some(node.root());
                    ControlFlow::Continue(())
                }
                Some(root) if root == node.root() => ControlFlow::Continue(()),
                Some(_) => ControlFlow::Break(()),
            }
        });

        let verdict = first_root.is_some() && duplicated.is_continue();
        tracing::debug!(name, verdict, "Checked single implementation");
        self.cache.insert(name, verdict);
        verdict
    }

    /// Fail with a diagnostic unless `name` has a single implementation.
    ///
    /// `message` replaces the generated diagnostic.
    pub fn assert_single_implementation(&self, name: &str, message: Option<&str>) -> Result<()> {
        if self.has_single_implementation(name) {
            return Ok(());
        }

        let report = self.report(name);
        let message = match message {
            Some(message) => message.to_string(),
            None => report.failure_message().unwrap_or_default(),
        };
        Err(Error::assertion(message))
    }
}
