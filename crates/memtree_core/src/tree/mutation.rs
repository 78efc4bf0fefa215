//! Copy-on-write edits over a memory tree.
//!
//! # Responsibility
//! - Insert, delete, rename and update nodes without touching the input tree.
//! - Keep tree invariants as the last line of defense behind caller checks.
//!
//! # Invariants
//! - Every operation returns a new tree or an error; the input never changes.
//! - Only nodes on the root-to-edit path are copied. All other subtrees are
//!   the same `Arc` as in the input, so pointer equality means "unchanged".
//! - A missing parent or target is always an error, never a silent no-op.

use crate::model::memory_node::{validate_subtree, MemoryNode, MemoryTree};
use crate::tree::error::{TreeError, TreeResult};
use crate::tree::path;
use crate::tree::query;
use std::collections::HashSet;
use std::sync::Arc;

/// Appends `child` (with its subtree) to the node at `parent_path`.
///
/// # Errors
/// - `ParentNotFound` when `parent_path` does not exist.
/// - `PathMismatch` / `InvalidName` when `child.path` is not
///   `join(parent_path, child.name)` or a descendant is inconsistent.
/// - `PathCollision` when `child.path` already exists.
/// - `DuplicateId` when an id of the incoming subtree is already used.
pub fn add_child(tree: &MemoryTree, parent_path: &str, child: MemoryNode) -> TreeResult<MemoryTree> {
    let parent = path::normalize(parent_path);
    if !query::exists(tree, &parent) {
        return Err(TreeError::ParentNotFound(parent));
    }

    let mut incoming_paths = HashSet::new();
    let mut incoming_ids = HashSet::new();
    validate_subtree(&child, &parent, &mut incoming_paths, &mut incoming_ids)?;

    if query::exists(tree, &child.path) {
        return Err(TreeError::PathCollision(child.path));
    }
    if let Some(existing) = query::iter_preorder(tree).find(|node| incoming_ids.contains(&node.id)) {
        return Err(TreeError::DuplicateId(existing.id));
    }

    let child = Arc::new(child);
    let root = rewrite_at(tree.root(), &parent, move |node| {
        let mut copy = node.clone();
        copy.children.push(child);
        copy
    })
    .map_err(|_| TreeError::ParentNotFound(parent.clone()))?;
    Ok(MemoryTree::from_trusted_root(root))
}

/// Removes the node at `target_path` together with all its descendants.
///
/// # Errors
/// - `RootDeletion` for the root path.
/// - `NodeNotFound` when `target_path` does not exist.
pub fn delete_subtree(tree: &MemoryTree, target_path: &str) -> TreeResult<MemoryTree> {
    let target = path::normalize(target_path);
    let parent = path::parent(&target).ok_or(TreeError::RootDeletion)?;
    if !query::exists(tree, &target) {
        return Err(TreeError::NodeNotFound(target));
    }

    let root = rewrite_at(tree.root(), &parent, |node| {
        let mut copy = node.clone();
        copy.children.retain(|child| child.path != target);
        copy
    })
    .map_err(|_| TreeError::NodeNotFound(target.clone()))?;
    Ok(MemoryTree::from_trusted_root(root))
}

/// Replaces the content of the node at `target_path`.
///
/// Identity (`id`, `path`, `name`) and children are preserved.
///
/// # Errors
/// - `NodeNotFound` when `target_path` does not exist.
pub fn update_content(
    tree: &MemoryTree,
    target_path: &str,
    content: impl Into<String>,
) -> TreeResult<MemoryTree> {
    let target = path::normalize(target_path);
    let content = content.into();
    let root = rewrite_at(tree.root(), &target, move |node| {
        let mut copy = node.clone();
        copy.content = content;
        copy
    })
    .map_err(|_| TreeError::NodeNotFound(target.clone()))?;
    Ok(MemoryTree::from_trusted_root(root))
}

/// Renames the node at `target_path`, rewriting paths of its whole subtree.
///
/// Ids and sibling position are preserved.
///
/// # Errors
/// - `RootRename` for the root path.
/// - `InvalidName` when `new_name` is blank or contains a separator.
/// - `NodeNotFound` when `target_path` does not exist.
/// - `PathCollision` when a sibling already uses `new_name`.
pub fn rename(tree: &MemoryTree, target_path: &str, new_name: &str) -> TreeResult<MemoryTree> {
    let target = path::normalize(target_path);
    let parent = path::parent(&target).ok_or(TreeError::RootRename)?;
    let name = path::validate_name(new_name)?;
    if !query::exists(tree, &target) {
        return Err(TreeError::NodeNotFound(target));
    }

    let new_path = path::join(&parent, &name);
    if new_path == target {
        return Ok(tree.clone());
    }
    if query::exists(tree, &new_path) {
        return Err(TreeError::PathCollision(new_path));
    }

    let root = rewrite_at(tree.root(), &parent, |node| {
        let mut copy = node.clone();
        for child in copy.children.iter_mut() {
            if child.path == target {
                let renamed = repath(child, &new_path, &name);
                *child = Arc::new(renamed);
            }
        }
        copy
    })
    .map_err(|_| TreeError::NodeNotFound(target.clone()))?;
    Ok(MemoryTree::from_trusted_root(root))
}

/// Rebuilds the path of `target` with `edit`, copying every ancestor.
///
/// Hands `edit` back as `Err` when `target` is not in this subtree so the
/// caller can keep searching without cloning the closure.
fn rewrite_at<F>(node: &Arc<MemoryNode>, target: &str, edit: F) -> Result<Arc<MemoryNode>, F>
where
    F: FnOnce(&MemoryNode) -> MemoryNode,
{
    if node.path == target {
        return Ok(Arc::new(edit(node.as_ref())));
    }
    if !path::is_same_or_descendant(target, &node.path) {
        return Err(edit);
    }

    let mut edit = edit;
    for (index, child) in node.children.iter().enumerate() {
        match rewrite_at(child, target, edit) {
            Ok(replacement) => {
                let mut copy = MemoryNode::clone(node);
                copy.children[index] = replacement;
                return Ok(Arc::new(copy));
            }
            Err(returned) => edit = returned,
        }
    }
    Err(edit)
}

fn repath(node: &MemoryNode, new_path: &str, new_name: &str) -> MemoryNode {
    MemoryNode {
        id: node.id,
        path: new_path.to_string(),
        name: new_name.to_string(),
        content: node.content.clone(),
        children: node
            .children
            .iter()
            .map(|child| {
                let child_path = path::join(new_path, &child.name);
                Arc::new(repath(child, &child_path, &child.name))
            })
            .collect(),
    }
}

impl MemoryTree {
    /// See [`add_child`].
    pub fn add_child(&self, parent_path: &str, child: MemoryNode) -> TreeResult<MemoryTree> {
        add_child(self, parent_path, child)
    }

    /// See [`delete_subtree`].
    pub fn delete_subtree(&self, target_path: &str) -> TreeResult<MemoryTree> {
        delete_subtree(self, target_path)
    }

    /// See [`update_content`].
    pub fn update_content(
        &self,
        target_path: &str,
        content: impl Into<String>,
    ) -> TreeResult<MemoryTree> {
        update_content(self, target_path, content)
    }

    /// See [`rename`].
    pub fn rename(&self, target_path: &str, new_name: &str) -> TreeResult<MemoryTree> {
        rename(self, target_path, new_name)
    }
}
