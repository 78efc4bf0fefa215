//! Content editor bookkeeping for the selected document.
//!
//! # Invariants
//! - `is_unsaved()` is exactly `value != persisted`.
//! - Loading another document discards the buffer and clears unsaved state.

/// Text buffer bound to one node path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    path: String,
    persisted: String,
    value: String,
}

impl EditorSession {
    /// Starts a session on `path` with its persisted content.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let persisted = content.into();
        Self {
            path: path.into(),
            value: persisted.clone(),
            persisted,
        }
    }

    /// Switches to another document, resetting the buffer.
    pub fn load(&mut self, path: impl Into<String>, content: impl Into<String>) {
        *self = Self::new(path, content);
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn persisted(&self) -> &str {
        &self.persisted
    }

    /// Replaces the edit buffer.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn is_unsaved(&self) -> bool {
        self.value != self.persisted
    }

    /// Adopts the buffer as persisted content after a successful commit.
    pub fn mark_saved(&mut self) {
        self.persisted = self.value.clone();
    }

    /// Follows a rename of the bound document without touching the buffer.
    pub(crate) fn rebind(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }
}

/// Returns whether a key press is the save shortcut (Ctrl+S / Cmd+S).
pub fn is_save_shortcut(key: &str, ctrl: bool, meta: bool) -> bool {
    (ctrl || meta) && key.eq_ignore_ascii_case("s")
}
