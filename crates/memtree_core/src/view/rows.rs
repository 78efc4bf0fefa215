//! Visible-row projection for a collapsible tree widget.
//!
//! # Invariants
//! - Rows follow pre-order traversal, so list order is top-to-bottom order.
//! - Children appear only under a node whose path is in the expanded set.
//! - A childless node is always a leaf row, whatever the expanded set says.

use crate::model::memory_node::{MemoryNode, MemoryTree};
use std::collections::HashSet;
use std::sync::Arc;

/// One rendered row of the tree widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    /// Shared node handle; pointer-equal to the tree's node.
    pub node: Arc<MemoryNode>,
    /// Distance from the root (root is 0).
    pub depth: usize,
    /// True only for nodes with children that are currently expanded.
    pub is_expanded: bool,
    pub has_children: bool,
}

impl VisibleRow {
    /// Horizontal indentation for this row.
    pub fn indent(&self, step: u16) -> usize {
        self.depth * usize::from(step)
    }

    pub fn path(&self) -> &str {
        &self.node.path
    }
}

/// Flattens `tree` into rows given the set of expanded paths.
pub fn flatten(tree: &MemoryTree, expanded: &HashSet<String>) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    flatten_recursive(tree.root(), 0, expanded, &mut rows);
    rows
}

fn flatten_recursive(
    node: &Arc<MemoryNode>,
    depth: usize,
    expanded: &HashSet<String>,
    rows: &mut Vec<VisibleRow>,
) {
    let has_children = node.has_children();
    let is_expanded = has_children && expanded.contains(&node.path);
    rows.push(VisibleRow {
        node: Arc::clone(node),
        depth,
        is_expanded,
        has_children,
    });

    if is_expanded {
        for child in &node.children {
            flatten_recursive(child, depth + 1, expanded, rows);
        }
    }
}

/// Returns the index of the row showing `path`, if visible.
pub fn row_index(rows: &[VisibleRow], path: &str) -> Option<usize> {
    rows.iter().position(|row| row.node.path == path)
}
