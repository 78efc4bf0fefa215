//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose tree operations to Dart via FRB over JSON snapshots.
//! - Keep the boundary stateless: every call receives the tree it acts on.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - A failed mutation never returns a snapshot; callers keep their tree.

use memtree_core::tree::path::{normalize, validate_name};
use memtree_core::{
    core_version as core_version_inner, flatten, init_logging as init_logging_inner, navigate,
    ping as ping_inner, MemoryNode, MemoryTree, NavCommand, TreeKey, VisibleRow,
};
use std::collections::HashSet;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Normalizes a slash-separated document path.
#[flutter_rust_bridge::frb(sync)]
pub fn normalize_path(path: String) -> String {
    normalize(&path)
}

/// One visible row of the tree widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRowItem {
    pub path: String,
    pub name: String,
    pub depth: u32,
    pub is_expanded: bool,
    pub has_children: bool,
}

/// Response envelope for row projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRowsResponse {
    pub ok: bool,
    pub rows: Vec<TreeRowItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Response envelope for tree mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeMutationResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Updated tree snapshot; `None` on failure.
    pub snapshot_json: Option<String>,
    /// Path of the affected node on success.
    pub path: Option<String>,
    pub message: String,
}

impl TreeMutationResponse {
    fn success(message: impl Into<String>, tree: &MemoryTree, path: String) -> Self {
        match tree.to_json_pretty() {
            Ok(snapshot_json) => Self {
                ok: true,
                snapshot_json: Some(snapshot_json),
                path: Some(path),
                message: message.into(),
            },
            Err(err) => Self::failure(format!("snapshot encode failed: {err}")),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            snapshot_json: None,
            path: None,
            message: message.into(),
        }
    }
}

/// Response envelope for one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeKeyResponse {
    pub ok: bool,
    /// `none|focus|expand|collapse|select|request_delete|request_add_child`.
    pub command: String,
    /// Row the command targets.
    pub path: Option<String>,
    /// New focused row index for `focus`.
    pub focus_index: Option<u32>,
    pub message: String,
}

/// Projects `snapshot_json` into visible rows for the given expanded paths.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Never panics; invalid snapshots yield `ok=false` with no rows.
#[flutter_rust_bridge::frb(sync)]
pub fn tree_visible_rows(snapshot_json: String, expanded_paths: Vec<String>) -> TreeRowsResponse {
    let tree = match parse_snapshot(&snapshot_json) {
        Ok(tree) => tree,
        Err(message) => {
            return TreeRowsResponse {
                ok: false,
                rows: Vec::new(),
                message,
            }
        }
    };
    let rows = flatten(&tree, &expanded_set(expanded_paths));
    TreeRowsResponse {
        ok: true,
        message: format!("{} row(s).", rows.len()),
        rows: rows.iter().map(to_row_item).collect(),
    }
}

/// Adds a document named `name` with `content` under `parent_path`.
///
/// Names are trimmed; blank names and names containing `/` are rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn tree_add_document(
    snapshot_json: String,
    parent_path: String,
    name: String,
    content: String,
) -> TreeMutationResponse {
    let result = parse_snapshot(&snapshot_json).and_then(|tree| {
        let name = validate_name(&name)
            .map_err(|err| format!("invalid document name: {err}"))?;
        let parent = normalize(&parent_path);
        let node = MemoryNode::new_document(&parent, &name, content);
        let created_path = node.path.clone();
        let next = tree
            .add_child(&parent, node)
            .map_err(|err| err.to_string())?;
        Ok((next, created_path))
    });
    match result {
        Ok((tree, path)) => TreeMutationResponse::success("Document created.", &tree, path),
        Err(message) => TreeMutationResponse::failure(format!("tree_add_document failed: {message}")),
    }
}

/// Deletes the subtree at `path`. The root cannot be deleted.
#[flutter_rust_bridge::frb(sync)]
pub fn tree_delete_document(snapshot_json: String, path: String) -> TreeMutationResponse {
    let target = normalize(&path);
    let result = parse_snapshot(&snapshot_json)
        .and_then(|tree| tree.delete_subtree(&target).map_err(|err| err.to_string()));
    match result {
        Ok(tree) => TreeMutationResponse::success("Document deleted.", &tree, target),
        Err(message) => {
            TreeMutationResponse::failure(format!("tree_delete_document failed: {message}"))
        }
    }
}

/// Replaces the content of the document at `path`.
#[flutter_rust_bridge::frb(sync)]
pub fn tree_update_content(
    snapshot_json: String,
    path: String,
    content: String,
) -> TreeMutationResponse {
    let target = normalize(&path);
    let result = parse_snapshot(&snapshot_json).and_then(|tree| {
        tree.update_content(&target, content)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(tree) => TreeMutationResponse::success("Content saved.", &tree, target),
        Err(message) => {
            TreeMutationResponse::failure(format!("tree_update_content failed: {message}"))
        }
    }
}

/// Computes the navigation command for `key` pressed on `focused_path`.
///
/// `key` is a DOM-style key name. A focused path that is not visible
/// yields `command=none`.
#[flutter_rust_bridge::frb(sync)]
pub fn tree_handle_key(
    snapshot_json: String,
    expanded_paths: Vec<String>,
    focused_path: String,
    key: String,
) -> TreeKeyResponse {
    let tree = match parse_snapshot(&snapshot_json) {
        Ok(tree) => tree,
        Err(message) => {
            return TreeKeyResponse {
                ok: false,
                command: "none".to_string(),
                path: None,
                focus_index: None,
                message,
            }
        }
    };

    let rows = flatten(&tree, &expanded_set(expanded_paths));
    let focused = normalize(&focused_path);
    let Some(index) = rows.iter().position(|row| row.path() == focused) else {
        return TreeKeyResponse {
            ok: true,
            command: "none".to_string(),
            path: None,
            focus_index: None,
            message: format!("`{focused}` is not visible"),
        };
    };

    let (command, path, focus_index) = match navigate(&rows, index, TreeKey::from_key_name(&key)) {
        NavCommand::None => ("none", None, None),
        NavCommand::Focus { index, path } => ("focus", Some(path), Some(to_u32(index))),
        NavCommand::Expand { path } => ("expand", Some(path), None),
        NavCommand::Collapse { path } => ("collapse", Some(path), None),
        NavCommand::Select { path } => ("select", Some(path), None),
        NavCommand::RequestDelete { path } => ("request_delete", Some(path), None),
        NavCommand::RequestAddChild { path } => ("request_add_child", Some(path), None),
    };
    TreeKeyResponse {
        ok: true,
        command: command.to_string(),
        path,
        focus_index,
        message: String::new(),
    }
}

fn parse_snapshot(snapshot_json: &str) -> Result<MemoryTree, String> {
    MemoryTree::from_json(snapshot_json).map_err(|err| format!("invalid snapshot: {err}"))
}

fn expanded_set(paths: Vec<String>) -> HashSet<String> {
    paths.iter().map(|path| normalize(path)).collect()
}

/// Saturates at `u32::MAX`.
fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_row_item(row: &VisibleRow) -> TreeRowItem {
    TreeRowItem {
        path: row.node.path.clone(),
        name: row.node.name.clone(),
        depth: to_u32(row.depth),
        is_expanded: row.is_expanded,
        has_children: row.has_children,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, normalize_path, ping, tree_add_document,
        tree_delete_document, tree_handle_key, tree_update_content, tree_visible_rows,
    };
    use memtree_core::MemoryTree;

    fn empty_snapshot() -> String {
        MemoryTree::new().to_json_pretty().expect("encode root tree")
    }

    fn snapshot_with(paths: &[(&str, &str)]) -> String {
        let mut snapshot = empty_snapshot();
        for (parent, name) in paths {
            let response =
                tree_add_document(snapshot, parent.to_string(), name.to_string(), String::new());
            assert!(response.ok, "{}", response.message);
            snapshot = response.snapshot_json.expect("snapshot on success");
        }
        snapshot
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn normalize_path_collapses_separators() {
        assert_eq!(normalize_path("//a///b/".to_string()), "/a/b");
    }

    #[test]
    fn add_then_list_rows() {
        let snapshot = snapshot_with(&[("/", "notes"), ("/notes", "todo")]);
        let response = tree_visible_rows(snapshot, vec!["/".to_string(), "notes".to_string()]);
        assert!(response.ok, "{}", response.message);
        let paths: Vec<&str> = response.rows.iter().map(|row| row.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/notes", "/notes/todo"]);
        assert_eq!(response.rows[2].depth, 2);

        let json: serde_json::Value =
            serde_json::from_str(&snapshot_with(&[("/", "x")])).expect("valid json");
        assert_eq!(json["children"][0]["path"], "/x");
    }

    #[test]
    fn add_rejects_separator_in_name() {
        let response = tree_add_document(
            empty_snapshot(),
            "/".to_string(),
            "x/y".to_string(),
            String::new(),
        );
        assert!(!response.ok);
        assert!(response.snapshot_json.is_none());
        assert!(response.message.contains("invalid document name"));
    }

    #[test]
    fn delete_root_fails_and_delete_child_succeeds() {
        let snapshot = snapshot_with(&[("/", "notes")]);
        let root = tree_delete_document(snapshot.clone(), "/".to_string());
        assert!(!root.ok);

        let deleted = tree_delete_document(snapshot, "/notes".to_string());
        assert!(deleted.ok, "{}", deleted.message);
        let tree = MemoryTree::from_json(&deleted.snapshot_json.expect("snapshot"))
            .expect("decode snapshot");
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn update_content_round_trips_through_snapshot() {
        let snapshot = snapshot_with(&[("/", "notes")]);
        let response = tree_update_content(snapshot, "/notes".to_string(), "Hello".to_string());
        assert!(response.ok, "{}", response.message);
        let tree = MemoryTree::from_json(&response.snapshot_json.expect("snapshot"))
            .expect("decode snapshot");
        assert_eq!(tree.find("/notes").expect("node").content, "Hello");
    }

    #[test]
    fn handle_key_reports_focus_moves() {
        let snapshot = snapshot_with(&[("/", "a"), ("/a", "b")]);
        let expanded = vec!["/".to_string(), "/a".to_string()];

        let down = tree_handle_key(
            snapshot.clone(),
            expanded.clone(),
            "/".to_string(),
            "ArrowDown".to_string(),
        );
        assert_eq!(down.command, "focus");
        assert_eq!(down.path.as_deref(), Some("/a"));
        assert_eq!(down.focus_index, Some(1));

        let left = tree_handle_key(snapshot, expanded, "/a/b".to_string(), "ArrowLeft".to_string());
        assert_eq!(left.command, "focus");
        assert_eq!(left.path.as_deref(), Some("/a"));
    }

    #[test]
    fn index_conversion_saturates() {
        assert_eq!(super::to_u32(7), 7);
        assert_eq!(super::to_u32(usize::MAX), u32::MAX);
    }

    #[test]
    fn invalid_snapshot_is_reported_not_panicked() {
        let response = tree_visible_rows("{".to_string(), Vec::new());
        assert!(!response.ok);
        assert!(response.message.starts_with("invalid snapshot"));
    }
}
