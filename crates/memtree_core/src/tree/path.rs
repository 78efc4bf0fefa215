//! Slash-separated path utilities for the memory tree.
//!
//! # Responsibility
//! - Produce canonical node paths (`/a/b`) from arbitrary user input.
//! - Compose and decompose canonical paths without touching the tree.
//! - Validate user-provided document names before any tree mutation.
//!
//! # Invariants
//! - `normalize` is total and idempotent.
//! - The root marker `/` is the only path without a parent.
//! - A canonical path never contains empty segments or a trailing separator.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Segment separator used by every canonical path.
pub const SEPARATOR: char = '/';
/// Canonical path of the tree root.
pub const ROOT_PATH: &str = "/";

/// Rejection reasons for user-provided document names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Name is blank after trim.
    Empty,
    /// Name contains the path separator.
    ContainsSeparator(String),
}

impl Display for NameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "name must not be blank"),
            Self::ContainsSeparator(name) => {
                write!(f, "name must not contain `{SEPARATOR}`: `{name}`")
            }
        }
    }
}

impl Error for NameError {}

/// Returns the canonical form of `path`.
///
/// Empty segments are dropped and a single leading separator is added.
/// `""` and `"/"` both normalize to [`ROOT_PATH`].
pub fn normalize(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split(SEPARATOR).filter(|segment| !segment.is_empty()) {
        normalized.push(SEPARATOR);
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push_str(ROOT_PATH);
    }
    normalized
}

/// Appends `name` as the final segment of the normalized `parent`.
///
/// `name` is not validated; callers reject separators and blank names with
/// [`validate_name`] first.
pub fn join(parent: &str, name: &str) -> String {
    let parent = normalize(parent);
    if parent == ROOT_PATH {
        format!("{SEPARATOR}{name}")
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Returns the parent path, or `None` for the root.
pub fn parent(path: &str) -> Option<String> {
    let path = normalize(path);
    if path == ROOT_PATH {
        return None;
    }
    match path.rsplit_once(SEPARATOR) {
        Some(("", _)) | None => Some(ROOT_PATH.to_string()),
        Some((prefix, _)) => Some(prefix.to_string()),
    }
}

/// Returns every prefix of `path`, root first and `path` itself last.
///
/// Used to compute which rows must be expanded to reveal a node.
pub fn ancestors(path: &str) -> Vec<String> {
    let path = normalize(path);
    let mut result = vec![ROOT_PATH.to_string()];
    let mut current = String::new();
    for segment in path.split(SEPARATOR).filter(|segment| !segment.is_empty()) {
        current.push(SEPARATOR);
        current.push_str(segment);
        result.push(current.clone());
    }
    result
}

/// Returns the final segment of a path, or `/` for the root.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rsplit(SEPARATOR).find(|segment| !segment.is_empty()) {
        Some(segment) => segment,
        None => ROOT_PATH,
    }
}

/// Returns whether `path` is the root after normalization.
pub fn is_root(path: &str) -> bool {
    normalize(path) == ROOT_PATH
}

/// Returns whether `path` equals `ancestor` or lies below it.
///
/// Both inputs are expected in canonical form.
pub fn is_same_or_descendant(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT_PATH || path == ancestor {
        return true;
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path[ancestor.len()..].starts_with(SEPARATOR)
}

/// Validates a user-provided document name and returns it trimmed.
pub fn validate_name(raw: &str) -> Result<String, NameError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    if trimmed.contains(SEPARATOR) {
        return Err(NameError::ContainsSeparator(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{file_name, is_same_or_descendant, parent};

    #[test]
    fn parent_of_top_level_is_root() {
        assert_eq!(parent("/notes").as_deref(), Some("/"));
        assert_eq!(parent("notes//todo/").as_deref(), Some("/notes"));
    }

    #[test]
    fn file_name_handles_root_and_trailing_separator() {
        assert_eq!(file_name("/"), "/");
        assert_eq!(file_name(""), "/");
        assert_eq!(file_name("/a/b/"), "b");
    }

    #[test]
    fn descendant_check_respects_segment_boundaries() {
        assert!(is_same_or_descendant("/a/b", "/a"));
        assert!(is_same_or_descendant("/a", "/a"));
        assert!(is_same_or_descendant("/a", "/"));
        assert!(!is_same_or_descendant("/ab", "/a"));
        assert!(!is_same_or_descendant("/a", "/a/b"));
    }
}
