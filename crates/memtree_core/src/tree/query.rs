//! Read-only lookups over a memory tree.
//!
//! # Invariants
//! - Lookups normalize the requested path before matching.
//! - No path index is kept; cost is bounded by the number of nodes.

use crate::model::memory_node::{MemoryNode, MemoryTree};
use crate::tree::path;
use std::sync::Arc;

/// Finds the node at `target_path` by depth-first search.
///
/// Branches whose path is not a prefix of the target are skipped.
pub fn find<'t>(tree: &'t MemoryTree, target_path: &str) -> Option<&'t Arc<MemoryNode>> {
    let target = path::normalize(target_path);
    find_in(tree.root(), &target)
}

/// Returns whether a node exists at `target_path`.
pub fn exists(tree: &MemoryTree, target_path: &str) -> bool {
    find(tree, target_path).is_some()
}

/// Returns the number of nodes in the tree, root included.
pub fn node_count(tree: &MemoryTree) -> usize {
    iter_preorder(tree).count()
}

/// Iterates nodes in pre-order, matching top-to-bottom display order.
pub fn iter_preorder(tree: &MemoryTree) -> PreorderIter<'_> {
    PreorderIter {
        stack: vec![tree.root()],
    }
}

/// Pre-order iterator returned by [`iter_preorder`].
pub struct PreorderIter<'t> {
    stack: Vec<&'t Arc<MemoryNode>>,
}

impl<'t> Iterator for PreorderIter<'t> {
    type Item = &'t Arc<MemoryNode>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

pub(crate) fn find_in<'t>(node: &'t Arc<MemoryNode>, target: &str) -> Option<&'t Arc<MemoryNode>> {
    if node.path == target {
        return Some(node);
    }
    if !path::is_same_or_descendant(target, &node.path) {
        return None;
    }
    node.children
        .iter()
        .find_map(|child| find_in(child, target))
}

impl MemoryTree {
    /// See [`find`].
    pub fn find(&self, target_path: &str) -> Option<&Arc<MemoryNode>> {
        find(self, target_path)
    }

    /// See [`exists`].
    pub fn exists(&self, target_path: &str) -> bool {
        exists(self, target_path)
    }

    /// See [`node_count`].
    pub fn len(&self) -> usize {
        node_count(self)
    }

    /// A tree always holds its root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// See [`iter_preorder`].
    pub fn iter(&self) -> PreorderIter<'_> {
        iter_preorder(self)
    }
}
