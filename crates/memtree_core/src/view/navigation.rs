//! Keyboard navigation over visible tree rows.
//!
//! # Responsibility
//! - Translate one key press on the focused row into one tree command.
//!
//! # Invariants
//! - Transitions are pure: the same rows, focus and key give the same command.
//! - The root row never produces a delete request.

use crate::view::rows::VisibleRow;

/// Key input understood by the tree widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Delete,
    Backspace,
    /// Any other printable character.
    Char(char),
    /// Non-printable key without tree semantics.
    Other,
}

impl TreeKey {
    /// Parses a DOM-style key name (`"ArrowDown"`, `" "`, `"a"`).
    pub fn from_key_name(value: &str) -> Self {
        match value {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Enter" => Self::Enter,
            " " | "Space" | "Spacebar" => Self::Space,
            "Delete" => Self::Delete,
            "Backspace" => Self::Backspace,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other,
                }
            }
        }
    }
}

/// Command produced by one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavCommand {
    /// Key has no effect in the current state.
    None,
    /// Move focus and selection to the row at `index`.
    Focus { index: usize, path: String },
    Expand { path: String },
    Collapse { path: String },
    Select { path: String },
    /// Caller should confirm and delete this row's node.
    RequestDelete { path: String },
    /// Caller should prompt for a name and create a child here.
    RequestAddChild { path: String },
}

/// Computes the command for `key` pressed on `rows[focused]`.
///
/// An out-of-range `focused` index yields [`NavCommand::None`].
pub fn navigate(rows: &[VisibleRow], focused: usize, key: TreeKey) -> NavCommand {
    let Some(row) = rows.get(focused) else {
        return NavCommand::None;
    };
    let path = row.node.path.clone();

    match key {
        TreeKey::ArrowDown => focus(rows, focused + 1),
        TreeKey::ArrowUp => match focused.checked_sub(1) {
            Some(index) => focus(rows, index),
            None => NavCommand::None,
        },
        TreeKey::ArrowRight => {
            if !row.has_children {
                NavCommand::None
            } else if row.is_expanded {
                focus(rows, focused + 1)
            } else {
                NavCommand::Expand { path }
            }
        }
        TreeKey::ArrowLeft => {
            if row.has_children && row.is_expanded {
                NavCommand::Collapse { path }
            } else {
                match parent_row_index(rows, focused) {
                    Some(index) => focus(rows, index),
                    None => NavCommand::None,
                }
            }
        }
        TreeKey::Enter | TreeKey::Space => NavCommand::Select { path },
        TreeKey::Delete | TreeKey::Backspace => {
            if row.node.is_root() {
                NavCommand::None
            } else {
                NavCommand::RequestDelete { path }
            }
        }
        TreeKey::Char('a') | TreeKey::Char('A') => NavCommand::RequestAddChild { path },
        TreeKey::Char(_) | TreeKey::Other => NavCommand::None,
    }
}

fn focus(rows: &[VisibleRow], index: usize) -> NavCommand {
    match rows.get(index) {
        Some(row) => NavCommand::Focus {
            index,
            path: row.node.path.clone(),
        },
        None => NavCommand::None,
    }
}

/// Nearest preceding row one level shallower than `rows[index]`.
fn parent_row_index(rows: &[VisibleRow], index: usize) -> Option<usize> {
    let depth = rows.get(index)?.depth;
    if depth == 0 {
        return None;
    }
    rows[..index].iter().rposition(|row| row.depth + 1 == depth)
}

#[cfg(test)]
mod tests {
    use super::TreeKey;

    #[test]
    fn parses_dom_key_names() {
        assert_eq!(TreeKey::from_key_name("ArrowDown"), TreeKey::ArrowDown);
        assert_eq!(TreeKey::from_key_name(" "), TreeKey::Space);
        assert_eq!(TreeKey::from_key_name("A"), TreeKey::Char('A'));
        assert_eq!(TreeKey::from_key_name("Escape"), TreeKey::Other);
    }
}
