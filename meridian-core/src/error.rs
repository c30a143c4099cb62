//! ABOUTME: Error types shared across the meridian retrieval core
//! ABOUTME: Every fallible core operation returns `Result<T, CoreError>`

use std::time::Duration;
use thiserror::Error;

/// Top-level error for the core. Propagated unchanged to the caller of
/// `hybrid_search` (the HTTP layer or CLI decides user-visible mapping).
#[derive(Debug, Error)]
pub enum CoreError {
    /// An invariant on the response or an intermediate value was violated.
    /// Fatal to the query; no partial response is ever returned.
    #[error("contract violation: {message}")]
    Contract { message: String },

    /// The audit sink failed to accept an event. Fatal: the query MUST NOT
    /// return results after an audit failure (fail-closed).
    #[error("audit log write failed: {message}")]
    Audit { message: String },

    /// A collaborator (lexical/vector/metadata/embedding) failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CoreError {
    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract {
            message: message.into(),
        }
    }

    pub fn audit(message: impl Into<String>) -> Self {
        Self::Audit {
            message: message.into(),
        }
    }
}

/// Failures from the four external collaborators the core depends on.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("lexical backend failed: {message}")]
    Lexical { message: String },

    #[error("vector backend failed: {message}")]
    Vector { message: String },

    #[error("embedding computation failed: {message}")]
    Embedding { message: String },

    #[error("metadata gateway failed: {message}")]
    Metadata { message: String },

    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CoreError>;
