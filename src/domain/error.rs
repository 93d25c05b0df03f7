//! Engine errors

use thiserror::Error;

use super::node::NodeRef;

/// Errors raised by tree operations and configuration loading.
///
/// Absent keys and empty trees are not errors; lookups report them with `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node limit reached: tree holds {limit} nodes")]
    CapacityExhausted { limit: usize },

    #[error("node handle already erased: {0}")]
    StaleHandle(NodeRef),

    #[error("node handle belongs to another tree: {0}")]
    ForeignHandle(NodeRef),

    #[error("red-black invariant violated: {reason}")]
    InvariantViolation { reason: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl TreeError {
    pub(crate) fn violation(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
