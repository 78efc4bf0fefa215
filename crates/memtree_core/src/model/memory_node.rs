//! Memory tree domain model.
//!
//! # Responsibility
//! - Define the document/folder node shared by every tree operation.
//! - Guard tree-wide invariants when a tree enters the core from outside.
//!
//! # Invariants
//! - `id` is stable and never reused for another node.
//! - `path` is canonical and equals `join(parent.path, name)` below the root.
//! - Nodes are immutable once wrapped in `Arc`; edits build new nodes.
//!
//! # See also
//! - `crate::tree::mutation` for copy-on-write edits.

use crate::tree::error::{TreeError, TreeResult};
use crate::tree::path::{self, ROOT_PATH};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identifier for one memory node.
pub type NodeId = Uuid;

/// One document or folder in the memory tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryNode {
    /// Opaque unique id; generated when absent from an incoming snapshot.
    #[serde(default = "Uuid::new_v4")]
    pub id: NodeId,
    /// Canonical absolute path, unique within a tree.
    pub path: String,
    /// Final path segment, used as display label.
    pub name: String,
    /// Markdown payload. Empty for container-only nodes.
    #[serde(default)]
    pub content: String,
    /// Ordered children; insertion order is display order.
    #[serde(default)]
    pub children: Vec<Arc<MemoryNode>>,
}

impl MemoryNode {
    /// Creates an empty root node.
    pub fn root() -> Self {
        Self::with_id(Uuid::new_v4(), ROOT_PATH, ROOT_PATH, "")
    }

    /// Creates a childless document under `parent_path` with a fresh id.
    ///
    /// `name` must already be validated by the caller.
    pub fn new_document(parent_path: &str, name: &str, content: impl Into<String>) -> Self {
        Self::with_id(
            Uuid::new_v4(),
            path::join(parent_path, name),
            name,
            content,
        )
    }

    /// Creates a childless node with caller-provided identity.
    ///
    /// Used by snapshot loading where identity already exists externally.
    pub fn with_id(
        id: NodeId,
        path: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            path: path.into(),
            name: name.into(),
            content: content.into(),
            children: Vec::new(),
        }
    }

    /// Builder-style helper appending one child.
    pub fn with_child(mut self, child: MemoryNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.path == ROOT_PATH
    }
}

/// Validated, persistent memory tree.
///
/// Cloning is cheap: the clone shares the root `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MemoryNode", into = "MemoryNode")]
pub struct MemoryTree {
    root: Arc<MemoryNode>,
}

impl MemoryTree {
    /// Creates a tree holding only an empty root.
    pub fn new() -> Self {
        Self {
            root: Arc::new(MemoryNode::root()),
        }
    }

    /// Validates `root` and every descendant, then wraps them as a tree.
    ///
    /// # Errors
    /// - `InvalidRoot` when the root path is not `/`.
    /// - `PathMismatch`, `PathCollision`, `DuplicateId` or `InvalidName` for
    ///   the first violating descendant.
    pub fn try_from_root(root: MemoryNode) -> TreeResult<Self> {
        Self::try_from_shared_root(Arc::new(root))
    }

    pub(crate) fn try_from_shared_root(root: Arc<MemoryNode>) -> TreeResult<Self> {
        if root.path != ROOT_PATH {
            return Err(TreeError::InvalidRoot(root.path.clone()));
        }
        let mut paths = HashSet::new();
        let mut ids = HashSet::new();
        paths.insert(root.path.clone());
        ids.insert(root.id);
        for child in &root.children {
            validate_subtree(child, ROOT_PATH, &mut paths, &mut ids)?;
        }
        Ok(Self { root })
    }

    /// Wraps a root produced by a mutation that already kept invariants.
    pub(crate) fn from_trusted_root(root: Arc<MemoryNode>) -> Self {
        Self { root }
    }

    /// Parses and validates a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes this tree as a pretty-printed JSON snapshot.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Shared root handle. Reference identity is meaningful for change detection.
    pub fn root(&self) -> &Arc<MemoryNode> {
        &self.root
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<MemoryNode> for MemoryTree {
    type Error = TreeError;

    fn try_from(value: MemoryNode) -> Result<Self, Self::Error> {
        Self::try_from_root(value)
    }
}

impl From<MemoryTree> for MemoryNode {
    fn from(value: MemoryTree) -> Self {
        Arc::unwrap_or_clone(value.root)
    }
}

/// Checks one incoming subtree against its parent path and the seen sets.
pub(crate) fn validate_subtree(
    node: &MemoryNode,
    parent_path: &str,
    paths: &mut HashSet<String>,
    ids: &mut HashSet<NodeId>,
) -> TreeResult<()> {
    let name = path::validate_name(&node.name)?;
    let expected = path::join(parent_path, &name);
    if node.name != name || node.path != expected {
        return Err(TreeError::PathMismatch {
            expected,
            actual: node.path.clone(),
        });
    }
    if !paths.insert(node.path.clone()) {
        return Err(TreeError::PathCollision(node.path.clone()));
    }
    if !ids.insert(node.id) {
        return Err(TreeError::DuplicateId(node.id));
    }
    for child in &node.children {
        validate_subtree(child, &node.path, paths, ids)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{MemoryNode, MemoryTree};
    use crate::tree::error::TreeError;

    #[test]
    fn new_document_joins_parent_path() {
        let node = MemoryNode::new_document("/notes", "todo", "- [ ] ship");
        assert_eq!(node.path, "/notes/todo");
        assert_eq!(node.name, "todo");
        assert!(!node.has_children());
    }

    #[test]
    fn try_from_root_rejects_non_root_path() {
        let node = MemoryNode::new_document("/", "notes", "");
        let err = MemoryTree::try_from_root(node).expect_err("non-root path must fail");
        assert_eq!(err, TreeError::InvalidRoot("/notes".to_string()));
    }

    #[test]
    fn try_from_root_rejects_inconsistent_child_path() {
        let mut child = MemoryNode::new_document("/", "notes", "");
        child.path = "/elsewhere".to_string();
        let err = MemoryTree::try_from_root(MemoryNode::root().with_child(child))
            .expect_err("mismatched path must fail");
        assert!(matches!(err, TreeError::PathMismatch { .. }));
    }

    #[test]
    fn try_from_root_rejects_duplicate_sibling_paths() {
        let root = MemoryNode::root()
            .with_child(MemoryNode::new_document("/", "a", ""))
            .with_child(MemoryNode::new_document("/", "a", ""));
        let err = MemoryTree::try_from_root(root).expect_err("duplicate path must fail");
        assert_eq!(err, TreeError::PathCollision("/a".to_string()));
    }

    #[test]
    fn json_snapshot_without_ids_gets_fresh_ids() {
        let json = r#"{
            "path": "/",
            "name": "/",
            "children": [{ "path": "/notes", "name": "notes", "content": "hi" }]
        }"#;
        let tree = MemoryTree::from_json(json).expect("snapshot should parse");
        assert_eq!(tree.root().children.len(), 1);
        assert_eq!(tree.root().children[0].content, "hi");
        assert_ne!(tree.root().id, tree.root().children[0].id);
    }

    #[test]
    fn json_snapshot_with_invalid_child_is_rejected() {
        let json = r#"{
            "path": "/",
            "name": "/",
            "children": [{ "path": "/x/y", "name": "x/y" }]
        }"#;
        assert!(MemoryTree::from_json(json).is_err());
    }
}
