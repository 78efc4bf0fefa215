//! Tree snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist a whole memory tree as one row per node.
//! - Rebuild and validate a tree from stored rows.
//! - Adapt a repository into a tree-change sink for manager sessions.
//!
//! # Invariants
//! - A save replaces the stored tree atomically in one transaction.
//! - Child order is stored in `sort_order` and restored exactly on load.
//! - Loaded trees pass `MemoryTree::try_from_root` or the load fails.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::memory_node::{MemoryNode, MemoryTree};
use crate::service::memory_manager::{TreeChange, TreeChangeSink};
use crate::tree::error::TreeError;
use log::{debug, error, info};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Result type used by snapshot repository operations.
pub type SnapshotRepoResult<T> = Result<T, SnapshotRepoError>;

/// Errors from snapshot repository operations.
#[derive(Debug)]
pub enum SnapshotRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Stored rows cannot be converted into nodes.
    InvalidData(String),
    /// Stored rows form a tree that violates tree invariants.
    InvalidTree(TreeError),
}

impl Display for SnapshotRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "snapshot repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "snapshot repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid snapshot data: {message}"),
            Self::InvalidTree(err) => write!(f, "invalid stored tree: {err}"),
        }
    }
}

impl Error for SnapshotRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidTree(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for SnapshotRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SnapshotRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Metadata recorded with the last saved snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub node_count: i64,
    /// Epoch ms of the last save.
    pub saved_at: i64,
}

/// Repository interface for whole-tree persistence.
pub trait TreeSnapshotRepository {
    /// Replaces the stored tree; returns the number of rows written.
    fn save_tree(&self, tree: &MemoryTree) -> SnapshotRepoResult<usize>;
    /// Loads the stored tree, or `None` when nothing was saved yet.
    fn load_tree(&self) -> SnapshotRepoResult<Option<MemoryTree>>;
    /// Metadata of the last save, if any.
    fn snapshot_info(&self) -> SnapshotRepoResult<Option<SnapshotInfo>>;
}

/// SQLite-backed snapshot repository.
#[derive(Clone, Copy)]
pub struct SqliteTreeSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTreeSnapshotRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> SnapshotRepoResult<Self> {
        ensure_snapshot_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

struct StoredRow {
    node_uuid: Uuid,
    path: String,
    parent_path: Option<String>,
    name: String,
    content: String,
}

impl TreeSnapshotRepository for SqliteTreeSnapshotRepository<'_> {
    fn save_tree(&self, tree: &MemoryTree) -> SnapshotRepoResult<usize> {
        let started_at = Instant::now();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM memory_nodes;", [])?;

        let written = insert_subtree(&tx, tree.root(), None, 0)?;
        let node_count = written as i64;
        tx.execute(
            "INSERT INTO snapshot_meta (id, node_count, saved_at)
             VALUES (1, ?1, (strftime('%s', 'now') * 1000))
             ON CONFLICT(id) DO UPDATE SET
                node_count = excluded.node_count,
                saved_at = excluded.saved_at;",
            params![node_count],
        )?;
        tx.commit()?;

        info!(
            "event=snapshot_save module=repo status=ok nodes={} duration_ms={}",
            written,
            started_at.elapsed().as_millis()
        );
        Ok(written)
    }

    fn load_tree(&self) -> SnapshotRepoResult<Option<MemoryTree>> {
        let mut stmt = self.conn.prepare(
            "SELECT node_uuid, path, parent_path, name, content
             FROM memory_nodes
             ORDER BY parent_path ASC, sort_order ASC, path ASC;",
        )?;
        let mut rows = stmt.query([])?;

        let mut root: Option<StoredRow> = None;
        let mut children_by_parent: HashMap<String, Vec<StoredRow>> = HashMap::new();
        let mut total = 0usize;
        while let Some(row) = rows.next()? {
            let node_uuid_text: String = row.get("node_uuid")?;
            let stored = StoredRow {
                node_uuid: parse_uuid(&node_uuid_text)?,
                path: row.get("path")?,
                parent_path: row.get("parent_path")?,
                name: row.get("name")?,
                content: row.get("content")?,
            };
            total += 1;
            match stored.parent_path.clone() {
                None if root.is_some() => {
                    return Err(SnapshotRepoError::InvalidData(format!(
                        "multiple root rows, second at `{}`",
                        stored.path
                    )));
                }
                None => root = Some(stored),
                Some(parent_path) => children_by_parent.entry(parent_path).or_default().push(stored),
            }
        }

        let Some(root) = root else {
            if total > 0 {
                return Err(SnapshotRepoError::InvalidData(
                    "stored rows have no root".to_string(),
                ));
            }
            return Ok(None);
        };

        let mut built = 0usize;
        let root_node = build_node(root, &mut children_by_parent, &mut built);
        if built != total {
            return Err(SnapshotRepoError::InvalidData(format!(
                "{} stored rows are not reachable from the root",
                total - built
            )));
        }

        let tree = MemoryTree::try_from_root(root_node).map_err(SnapshotRepoError::InvalidTree)?;
        debug!("event=snapshot_load module=repo status=ok nodes={built}");
        Ok(Some(tree))
    }

    fn snapshot_info(&self) -> SnapshotRepoResult<Option<SnapshotInfo>> {
        let info = self
            .conn
            .query_row(
                "SELECT node_count, saved_at FROM snapshot_meta WHERE id = 1;",
                [],
                |row| {
                    Ok(SnapshotInfo {
                        node_count: row.get(0)?,
                        saved_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }
}

fn insert_subtree(
    conn: &Connection,
    node: &MemoryNode,
    parent_path: Option<&str>,
    sort_order: i64,
) -> SnapshotRepoResult<usize> {
    conn.execute(
        "INSERT INTO memory_nodes (
            node_uuid,
            path,
            parent_path,
            name,
            content,
            sort_order
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            node.id.to_string(),
            node.path,
            parent_path,
            node.name,
            node.content,
            sort_order,
        ],
    )?;

    let mut written = 1;
    for (index, child) in node.children.iter().enumerate() {
        written += insert_subtree(conn, child, Some(node.path.as_str()), index as i64)?;
    }
    Ok(written)
}

fn build_node(
    row: StoredRow,
    children_by_parent: &mut HashMap<String, Vec<StoredRow>>,
    built: &mut usize,
) -> MemoryNode {
    *built += 1;
    let mut node = MemoryNode::with_id(row.node_uuid, row.path, row.name, row.content);
    let children = children_by_parent.remove(&node.path).unwrap_or_default();
    for child in children {
        node = node.with_child(build_node(child, children_by_parent, built));
    }
    node
}

fn parse_uuid(value: &str) -> SnapshotRepoResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        SnapshotRepoError::InvalidData(format!("invalid uuid `{value}` in memory_nodes.node_uuid"))
    })
}

fn ensure_snapshot_connection_ready(conn: &Connection) -> SnapshotRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(SnapshotRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["memory_nodes", "snapshot_meta"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(SnapshotRepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

/// Persists every committed tree through a snapshot repository.
///
/// Save failures are logged and dropped; the session keeps its tree.
pub struct SnapshotSink<R: TreeSnapshotRepository> {
    repo: R,
}

impl<R: TreeSnapshotRepository> SnapshotSink<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }
}

impl<R: TreeSnapshotRepository> TreeChangeSink for SnapshotSink<R> {
    fn on_tree_changed(&mut self, tree: &MemoryTree, change: &TreeChange) {
        if let Err(err) = self.repo.save_tree(tree) {
            error!(
                "event=snapshot_save module=repo status=error change={} nodes={} error={}",
                change.event_name(),
                tree.len(),
                err
            );
        }
    }
}
