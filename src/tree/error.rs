//! Topic tree error types

use thiserror::Error;

/// Errors that can occur while mutating or querying the topic tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The member holds no registration at this exact path
    #[error("Member not registered at path: {path}")]
    NotRegistered { path: String },

    /// The path is empty or contains an empty segment
    #[error("Invalid topic path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },
}

/// Result type alias for topic tree operations
pub type TreeResult<T> = Result<T, TreeError>;
