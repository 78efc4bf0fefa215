use crate::model::memory_node::NodeId;
use crate::tree::path::NameError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by tree construction and mutation.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors from tree construction, query-guarded edits and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Parent path of an insert does not exist.
    ParentNotFound(String),
    /// Target path of an edit does not exist.
    NodeNotFound(String),
    /// Node path is not `join(parent.path, name)`.
    PathMismatch { expected: String, actual: String },
    /// Another node already owns this path.
    PathCollision(String),
    /// Another node already owns this id.
    DuplicateId(NodeId),
    /// Root node cannot be deleted.
    RootDeletion,
    /// Root node cannot be renamed.
    RootRename,
    /// Tree root does not carry the root path.
    InvalidRoot(String),
    /// Node name is blank or contains a separator.
    InvalidName(NameError),
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParentNotFound(path) => write!(f, "parent not found: {path}"),
            Self::NodeNotFound(path) => write!(f, "node not found: {path}"),
            Self::PathMismatch { expected, actual } => {
                write!(f, "node path `{actual}` does not match expected `{expected}`")
            }
            Self::PathCollision(path) => write!(f, "path already exists: {path}"),
            Self::DuplicateId(id) => write!(f, "node id already exists: {id}"),
            Self::RootDeletion => write!(f, "root node cannot be deleted"),
            Self::RootRename => write!(f, "root node cannot be renamed"),
            Self::InvalidRoot(path) => write!(f, "tree root must have path `/`, got `{path}`"),
            Self::InvalidName(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NameError> for TreeError {
    fn from(value: NameError) -> Self {
        Self::InvalidName(value)
    }
}
