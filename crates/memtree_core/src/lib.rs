//! Core domain logic for memtree, the memory manager document tree.
//! This crate is the single source of truth for tree invariants.

pub mod cache;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;
pub mod tree;
pub mod view;

pub use cache::suggestion_cache::{CacheError, SuggestionCache, SuggestionCaches};
pub use config::{ConfigError, MemtreeConfig};
pub use logging::{default_log_level, init_logging, init_logging_with_config, logging_status};
pub use model::memory_node::{MemoryNode, MemoryTree, NodeId};
pub use registry::view_registry::{
    ViewCategory, ViewDescriptor, ViewRegistry, ViewRegistryError, ViewResolution,
};
pub use repo::snapshot_repo::{
    SnapshotInfo, SnapshotRepoError, SnapshotRepoResult, SnapshotSink,
    SqliteTreeSnapshotRepository, TreeSnapshotRepository,
};
pub use service::editor_session::{is_save_shortcut, EditorSession};
pub use service::memory_manager::{
    KeyOutcome, ManagerError, MemoryManager, TreeChange, TreeChangeSink,
};
pub use tree::error::{TreeError, TreeResult};
pub use tree::path::{NameError, ROOT_PATH, SEPARATOR};
pub use view::navigation::{navigate, NavCommand, TreeKey};
pub use view::preview::{derive_preview, DocumentPreview};
pub use view::rows::{flatten, VisibleRow};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
