//! Memory manager session use-case service.
//!
//! # Responsibility
//! - Own the current tree, expansion state, focus, selection and editor buffer
//!   for one tree widget.
//! - Validate user input before any tree mutation.
//! - Notify change sinks with the new tree after every successful mutation.
//!
//! # Invariants
//! - `selected_path` and `focused_path` always exist in the current tree.
//! - Invalid names are rejected before the tree is touched.
//! - Sinks observe only fully valid trees; a failed mutation notifies nobody.
//!
//! # See also
//! - `crate::tree::mutation` for the underlying copy-on-write edits.

use crate::config::MemtreeConfig;
use crate::model::memory_node::{MemoryNode, MemoryTree};
use crate::service::editor_session::{is_save_shortcut, EditorSession};
use crate::tree::error::TreeError;
use crate::tree::path::{self, NameError, ROOT_PATH};
use crate::view::navigation::{navigate, NavCommand, TreeKey};
use crate::view::preview::{derive_preview, DocumentPreview};
use crate::view::rows::{flatten, row_index, VisibleRow};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Description of one committed tree mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    DocumentCreated { path: String },
    DocumentDeleted { path: String },
    DocumentRenamed { from: String, to: String },
    ContentUpdated { path: String },
}

impl TreeChange {
    /// Metadata-only label for log events.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::DocumentCreated { .. } => "document_created",
            Self::DocumentDeleted { .. } => "document_deleted",
            Self::DocumentRenamed { .. } => "document_renamed",
            Self::ContentUpdated { .. } => "content_updated",
        }
    }
}

/// Receiver of tree-change notifications, e.g. a persistence layer.
///
/// Sinks cannot fail the mutation; they handle their own errors.
pub trait TreeChangeSink {
    fn on_tree_changed(&mut self, tree: &MemoryTree, change: &TreeChange);
}

/// Errors from memory manager operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    /// User-provided name failed validation; shown next to the input.
    InvalidName(NameError),
    /// Tree rejected the mutation.
    Tree(TreeError),
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "invalid document name: {err}"),
            Self::Tree(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::Tree(err) => Some(err),
        }
    }
}

impl From<NameError> for ManagerError {
    fn from(value: NameError) -> Self {
        Self::InvalidName(value)
    }
}

impl From<TreeError> for ManagerError {
    fn from(value: TreeError) -> Self {
        match value {
            TreeError::InvalidName(err) => Self::InvalidName(err),
            other => Self::Tree(other),
        }
    }
}

/// Effect of one key press as seen by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Unchanged,
    FocusMoved(String),
    Expanded(String),
    Collapsed(String),
    Selected(String),
    /// UI should confirm, then call `delete_document`.
    DeleteRequested(String),
    /// UI should prompt for a name, then call `create_document`.
    AddChildRequested(String),
}

/// Session state for one memory manager widget.
pub struct MemoryManager<'s> {
    tree: MemoryTree,
    expanded: HashSet<String>,
    selected_path: String,
    focused_path: String,
    editor: EditorSession,
    indent_step: u16,
    sinks: Vec<Box<dyn TreeChangeSink + 's>>,
}

impl<'s> MemoryManager<'s> {
    /// Opens a session over `tree`.
    ///
    /// An unknown `initial_selected` falls back to the root. Every ancestor of
    /// the selection is expanded so the selected row is visible.
    pub fn new(tree: MemoryTree, initial_selected: Option<&str>, config: &MemtreeConfig) -> Self {
        let selected_path = match initial_selected.map(path::normalize) {
            Some(candidate) if tree.exists(&candidate) => candidate,
            Some(candidate) => {
                warn!(
                    "event=manager_open module=service status=fallback reason=selection_missing depth={}",
                    path::ancestors(&candidate).len() - 1
                );
                ROOT_PATH.to_string()
            }
            None => ROOT_PATH.to_string(),
        };

        let mut expanded = HashSet::new();
        if config.expand_root_on_open {
            expanded.insert(ROOT_PATH.to_string());
        }
        if let Some(parent) = path::parent(&selected_path) {
            expanded.extend(path::ancestors(&parent));
        }

        let content = tree
            .find(&selected_path)
            .map(|node| node.content.clone())
            .unwrap_or_default();
        info!(
            "event=manager_open module=service status=ok nodes={} selected_root={}",
            tree.len(),
            path::is_root(&selected_path)
        );

        Self {
            editor: EditorSession::new(selected_path.clone(), content),
            focused_path: selected_path.clone(),
            selected_path,
            expanded,
            tree,
            indent_step: config.indent_step,
            sinks: Vec::new(),
        }
    }

    /// Registers a change sink notified after every committed mutation.
    pub fn subscribe(&mut self, sink: Box<dyn TreeChangeSink + 's>) {
        self.sinks.push(sink);
    }

    pub fn tree(&self) -> &MemoryTree {
        &self.tree
    }

    pub fn selected_path(&self) -> &str {
        &self.selected_path
    }

    pub fn focused_path(&self) -> &str {
        &self.focused_path
    }

    pub fn selected_node(&self) -> Option<&Arc<MemoryNode>> {
        self.tree.find(&self.selected_path)
    }

    pub fn expanded_paths(&self) -> &HashSet<String> {
        &self.expanded
    }

    pub fn is_expanded(&self, target_path: &str) -> bool {
        self.expanded.contains(&path::normalize(target_path))
    }

    pub fn indent_step(&self) -> u16 {
        self.indent_step
    }

    /// Rows currently visible in the tree widget.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        flatten(&self.tree, &self.expanded)
    }

    /// Selects and focuses `target_path`, revealing it and loading its content.
    ///
    /// Re-selecting the path already in the editor keeps the buffer.
    pub fn select(&mut self, target_path: &str) -> Result<(), ManagerError> {
        let target = path::normalize(target_path);
        let content = self
            .tree
            .find(&target)
            .map(|node| node.content.clone())
            .ok_or_else(|| TreeError::NodeNotFound(target.clone()))?;

        if let Some(parent) = path::parent(&target) {
            self.expanded.extend(path::ancestors(&parent));
        }
        if self.editor.path() != target {
            if self.editor.is_unsaved() {
                debug!(
                    "event=editor_discard module=service status=ok chars={}",
                    self.editor.value().chars().count()
                );
            }
            self.editor.load(target.clone(), content);
        }
        self.focused_path = target.clone();
        self.selected_path = target;
        Ok(())
    }

    /// Expands `target_path`; returns whether state changed.
    pub fn expand(&mut self, target_path: &str) -> bool {
        self.expanded.insert(path::normalize(target_path))
    }

    /// Collapses `target_path`; returns whether state changed.
    pub fn collapse(&mut self, target_path: &str) -> bool {
        let target = path::normalize(target_path);
        let changed = self.expanded.remove(&target);
        if changed && path::is_same_or_descendant(&self.focused_path, &target) {
            self.focused_path = target;
        }
        changed
    }

    /// Flips expansion of `target_path`; returns the new expanded state.
    pub fn toggle_expanded(&mut self, target_path: &str) -> bool {
        if self.is_expanded(target_path) {
            self.collapse(target_path);
            false
        } else {
            self.expand(target_path);
            true
        }
    }

    /// Applies one key press to the focused row.
    pub fn handle_key(&mut self, key: TreeKey) -> KeyOutcome {
        let rows = self.visible_rows();
        let focused = self.focused_row_index(&rows);

        match navigate(&rows, focused, key) {
            NavCommand::None => KeyOutcome::Unchanged,
            NavCommand::Focus { path, .. } => {
                self.focused_path = path.clone();
                KeyOutcome::FocusMoved(path)
            }
            NavCommand::Expand { path } => {
                self.expanded.insert(path.clone());
                KeyOutcome::Expanded(path)
            }
            NavCommand::Collapse { path } => {
                self.collapse(&path);
                KeyOutcome::Collapsed(path)
            }
            NavCommand::Select { path } => match self.select(&path) {
                Ok(()) => KeyOutcome::Selected(path),
                Err(_) => KeyOutcome::Unchanged,
            },
            NavCommand::RequestDelete { path } => KeyOutcome::DeleteRequested(path),
            NavCommand::RequestAddChild { path } => KeyOutcome::AddChildRequested(path),
        }
    }

    /// Creates an empty document named `raw_name` under `parent_path`.
    ///
    /// On success the parent is expanded and the new document selected.
    ///
    /// # Errors
    /// - `InvalidName` for blank names or names containing `/`.
    /// - `Tree(ParentNotFound | PathCollision)` from the tree.
    pub fn create_document(
        &mut self,
        parent_path: &str,
        raw_name: &str,
    ) -> Result<String, ManagerError> {
        let name = path::validate_name(raw_name)?;
        let parent = path::normalize(parent_path);
        let node = MemoryNode::new_document(&parent, &name, "");
        let created_path = node.path.clone();

        let next = self.tree.add_child(&parent, node)?;
        self.commit(
            next,
            TreeChange::DocumentCreated {
                path: created_path.clone(),
            },
        );
        self.expanded.insert(parent);
        self.select(&created_path)?;
        Ok(created_path)
    }

    /// Deletes the subtree at `target_path`.
    ///
    /// Selection or focus inside the deleted subtree moves to its parent.
    pub fn delete_document(&mut self, target_path: &str) -> Result<(), ManagerError> {
        let target = path::normalize(target_path);
        let next = self.tree.delete_subtree(&target)?;
        let parent = path::parent(&target).unwrap_or_else(|| ROOT_PATH.to_string());

        self.commit(next, TreeChange::DocumentDeleted { path: target.clone() });
        self.expanded
            .retain(|expanded| !path::is_same_or_descendant(expanded, &target));
        if path::is_same_or_descendant(&self.selected_path, &target) {
            self.select(&parent)?;
        } else if path::is_same_or_descendant(&self.focused_path, &target) {
            self.focused_path = parent;
        }
        Ok(())
    }

    /// Renames the document at `target_path`; returns its new path.
    ///
    /// Expansion, focus, selection and the editor binding follow the rename.
    pub fn rename_document(
        &mut self,
        target_path: &str,
        raw_name: &str,
    ) -> Result<String, ManagerError> {
        let target = path::normalize(target_path);
        let name = path::validate_name(raw_name)?;
        let next = self.tree.rename(&target, &name)?;
        let parent = path::parent(&target).ok_or(TreeError::RootRename)?;
        let renamed_path = path::join(&parent, &name);
        if renamed_path == target {
            return Ok(renamed_path);
        }

        self.commit(
            next,
            TreeChange::DocumentRenamed {
                from: target.clone(),
                to: renamed_path.clone(),
            },
        );
        self.expanded = self
            .expanded
            .drain()
            .map(|expanded| reprefix(&expanded, &target, &renamed_path))
            .collect();
        self.selected_path = reprefix(&self.selected_path, &target, &renamed_path);
        self.focused_path = reprefix(&self.focused_path, &target, &renamed_path);
        let editor_path = reprefix(self.editor.path(), &target, &renamed_path);
        self.editor.rebind(editor_path);
        Ok(renamed_path)
    }

    pub fn editor(&self) -> &EditorSession {
        &self.editor
    }

    /// Replaces the editor buffer of the selected document.
    pub fn set_editor_value(&mut self, value: impl Into<String>) {
        self.editor.set_value(value);
    }

    pub fn is_unsaved(&self) -> bool {
        self.editor.is_unsaved()
    }

    /// Commits the editor buffer; returns `false` when nothing was unsaved.
    pub fn save(&mut self) -> Result<bool, ManagerError> {
        if !self.editor.is_unsaved() {
            return Ok(false);
        }
        let target = self.editor.path().to_string();
        let next = self.tree.update_content(&target, self.editor.value())?;
        self.commit(next, TreeChange::ContentUpdated { path: target });
        self.editor.mark_saved();
        Ok(true)
    }

    /// Saves when the key press is Ctrl+S / Cmd+S; returns whether it saved.
    pub fn handle_save_shortcut(
        &mut self,
        key: &str,
        ctrl: bool,
        meta: bool,
    ) -> Result<bool, ManagerError> {
        if !is_save_shortcut(key, ctrl, meta) {
            return Ok(false);
        }
        self.save()
    }

    /// Preview of the editor buffer for the content pane header.
    pub fn selected_preview(&self) -> DocumentPreview {
        derive_preview(self.editor.value())
    }

    fn focused_row_index(&self, rows: &[VisibleRow]) -> usize {
        path::ancestors(&self.focused_path)
            .iter()
            .rev()
            .find_map(|candidate| row_index(rows, candidate))
            .unwrap_or(0)
    }

    fn commit(&mut self, next: MemoryTree, change: TreeChange) {
        self.tree = next;
        debug!(
            "event={} module=service status=ok nodes={} sinks={}",
            change.event_name(),
            self.tree.len(),
            self.sinks.len()
        );
        for sink in self.sinks.iter_mut() {
            sink.on_tree_changed(&self.tree, &change);
        }
    }
}

fn reprefix(value: &str, old_prefix: &str, new_prefix: &str) -> String {
    if path::is_same_or_descendant(value, old_prefix) {
        format!("{new_prefix}{}", &value[old_prefix.len()..])
    } else {
        value.to_string()
    }
}
