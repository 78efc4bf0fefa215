//! Explicit registry of views keyed by template name.
//!
//! # Invariants
//! - Keys are trimmed, non-empty and limited to `[a-z0-9._-]`.
//! - A key is registered at most once.
//! - Unregistered keys resolve to `NoViewAvailable`, never a panic.

use log::error;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRegistryError {
    InvalidKey(String),
    DuplicateKey(String),
}

impl Display for ViewRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(value) => write!(f, "view key is invalid: {value}"),
            Self::DuplicateKey(value) => write!(f, "view key already registered: {value}"),
        }
    }
}

impl Error for ViewRegistryError {}

/// Which editor surface a descriptor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCategory {
    /// Property/config form for a node.
    ConfigView,
    /// Node type rendered in a tree or canvas.
    NodeType,
}

/// Registered view metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDescriptor {
    pub key: String,
    pub label: String,
    pub category: ViewCategory,
}

impl ViewDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, category: ViewCategory) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            category,
        }
    }
}

/// Lookup result with an explicit "no view" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewResolution<'r> {
    Available(&'r ViewDescriptor),
    NoViewAvailable,
}

/// Template-name to descriptor table.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    views: BTreeMap<String, ViewDescriptor>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the memory manager's built-in views.
    pub fn memory_manager_defaults() -> Self {
        let mut registry = Self::new();
        for descriptor in [
            ViewDescriptor::new("memory.document", "Document", ViewCategory::NodeType),
            ViewDescriptor::new("memory.folder", "Folder", ViewCategory::NodeType),
            ViewDescriptor::new("memory.document.editor", "Markdown editor", ViewCategory::ConfigView),
        ] {
            if let Err(err) = registry.register(descriptor) {
                error!("event=view_register module=registry status=error error={err}");
            }
        }
        registry
    }

    /// Registers one descriptor under its trimmed key.
    pub fn register(&mut self, mut descriptor: ViewDescriptor) -> Result<(), ViewRegistryError> {
        let key = descriptor.key.trim().to_string();
        if !is_valid_view_key(&key) {
            return Err(ViewRegistryError::InvalidKey(key));
        }
        if self.views.contains_key(&key) {
            return Err(ViewRegistryError::DuplicateKey(key));
        }
        descriptor.key = key.clone();
        self.views.insert(key, descriptor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Returns sorted keys.
    pub fn keys(&self) -> Vec<String> {
        self.views.keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<&ViewDescriptor> {
        self.views.get(key.trim())
    }

    pub fn resolve(&self, key: &str) -> ViewResolution<'_> {
        match self.get(key) {
            Some(descriptor) => ViewResolution::Available(descriptor),
            None => ViewResolution::NoViewAvailable,
        }
    }

    /// Descriptors of one category, sorted by key.
    pub fn by_category(&self, category: ViewCategory) -> Vec<&ViewDescriptor> {
        self.views
            .values()
            .filter(|descriptor| descriptor.category == category)
            .collect()
    }
}

fn is_valid_view_key(value: &str) -> bool {
    !value.is_empty()
        && value.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' || c == '.'
        })
}

#[cfg(test)]
mod tests {
    use super::{ViewCategory, ViewDescriptor, ViewRegistry, ViewRegistryError, ViewResolution};

    #[test]
    fn registers_and_resolves_view() {
        let mut registry = ViewRegistry::new();
        registry
            .register(ViewDescriptor::new(
                "agent.config",
                "Agent",
                ViewCategory::ConfigView,
            ))
            .expect("view should register");

        match registry.resolve(" agent.config ") {
            ViewResolution::Available(descriptor) => assert_eq!(descriptor.label, "Agent"),
            ViewResolution::NoViewAvailable => panic!("registered key should resolve"),
        }
    }

    #[test]
    fn built_in_views_all_register() {
        let registry = ViewRegistry::memory_manager_defaults();
        assert_eq!(
            registry.keys(),
            vec!["memory.document", "memory.document.editor", "memory.folder"]
        );
        assert_eq!(registry.by_category(ViewCategory::NodeType).len(), 2);
    }

    #[test]
    fn unregistered_key_has_no_view() {
        let registry = ViewRegistry::memory_manager_defaults();
        assert_eq!(registry.resolve("mcp.server"), ViewResolution::NoViewAvailable);
        assert!(registry.get("mcp.server").is_none());
    }

    #[test]
    fn rejects_invalid_and_duplicate_keys() {
        let mut registry = ViewRegistry::new();
        let invalid = registry.register(ViewDescriptor::new(
            "Agent Config",
            "Agent",
            ViewCategory::ConfigView,
        ));
        assert!(matches!(invalid, Err(ViewRegistryError::InvalidKey(_))));

        registry
            .register(ViewDescriptor::new("tool", "Tool", ViewCategory::NodeType))
            .expect("first registration");
        let duplicate =
            registry.register(ViewDescriptor::new(" tool ", "Tool", ViewCategory::NodeType));
        assert_eq!(
            duplicate,
            Err(ViewRegistryError::DuplicateKey("tool".to_string()))
        );
    }

    #[test]
    fn defaults_group_by_category() {
        let registry = ViewRegistry::memory_manager_defaults();
        assert_eq!(registry.len(), 3);
        let node_types = registry.by_category(ViewCategory::NodeType);
        assert_eq!(node_types.len(), 2);
        assert_eq!(node_types[0].key, "memory.document");
    }
}
