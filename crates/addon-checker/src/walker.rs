//! Depth-first traversal of an addon tree.
//!
//! Traversal is pre-order: a node is visited before its children, and
//! children in declaration order. The node the walk starts from is not
//! itself visited. A match never prunes its subtree, so a duplicate nested
//! inside another duplicate is still reported.

use std::collections::HashMap;
use std::convert::Infallible;
use std::ops::ControlFlow;

use crate::tree::AddonTree;

/// Walks the descendants of one node.
#[derive(Debug)]
pub struct TreeWalker<'t, N> {
    root: &'t N,
}

impl<'t, N> Clone for TreeWalker<'t, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'t, N> Copy for TreeWalker<'t, N> {}

impl<'t, N: AddonTree> TreeWalker<'t, N> {
    pub fn new(root: &'t N) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &'t N {
        self.root
    }

    /// Visit every descendant in traversal order until `visit` breaks.
    ///
    /// A child that is already on the current path is skipped, so a
    /// malformed host tree that links back to an ancestor cannot loop
    /// forever. Nodes shared between siblings are still visited once per
    /// parent.
    pub fn try_for_each<B>(
        &self,
        mut visit: impl FnMut(&'t N) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        let mut path = Vec::new();
        descend(self.root, &mut path, &mut visit)
    }

    /// Visit every descendant in traversal order.
    pub fn for_each(&self, mut visit: impl FnMut(&'t N)) {
        let ControlFlow::Continue(()) = self.try_for_each::<Infallible>(|node| {
            visit(node);
            ControlFlow::Continue(())
        });
    }

    /// Every descendant, in traversal order.
    pub fn all_addons(&self) -> Vec<&'t N> {
        let mut all = Vec::new();
        self.for_each(|node| all.push(node));
        all
    }

    /// Every descendant named `name`, in traversal order.
    pub fn filter_by_name(&self, name: &str) -> Vec<&'t N> {
        let mut matches = Vec::new();
        self.for_each(|node| {
            if node.name() == name {
                matches.push(node);
            }
        });
        tracing::trace!(name, matches = matches.len(), "Filtered addons by name");
        matches
    }

    /// Matches for each requested name, gathered in a single traversal.
    ///
    /// Every requested name has an entry, empty when nothing matched.
    pub fn filter_by_names<S: AsRef<str>>(&self, names: &[S]) -> HashMap<String, Vec<&'t N>> {
        let mut buckets: HashMap<String, Vec<&'t N>> = names
            .iter()
            .map(|name| (name.as_ref().to_string(), Vec::new()))
            .collect();

        self.for_each(|node| {
            if let Some(bucket) = buckets.get_mut(node.name()) {
                bucket.push(node);
            }
        });
        buckets
    }
}

fn descend<'t, N: AddonTree, B>(
    node: &'t N,
    path: &mut Vec<&'t N>,
    visit: &mut impl FnMut(&'t N) -> ControlFlow<B>,
) -> ControlFlow<B> {
    path.push(node);
    for child in node.addons() {
        if path.iter().any(|ancestor| std::ptr::eq(*ancestor, child)) {
            tracing::warn!(name = child.name(), "Skipping addon that is its own ancestor");
            continue;
        }
        if let ControlFlow::Break(b) = visit(child) {
            path.pop();
            return ControlFlow::Break(b);
        }
        if let ControlFlow::Break(b) = descend(child, path, visit) {
            path.pop();
            return ControlFlow::Break(b);
        }
    }
    path.pop();
    ControlFlow::Continue(())
}
