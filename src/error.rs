//! Error types for path allocation
//!
//! Only malformed input and configuration surface as errors. Filesystem
//! probing never fails an allocation: probe I/O errors degrade to the
//! conservative verdict and are logged instead.

use thiserror::Error;

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PathError>;

/// Main error type for all allocation operations
#[derive(Debug, Error)]
pub enum PathError {
    /// Malformed structural class name, rejected before any node is touched
    #[error("Invalid class identifier {identifier:?}: {reason}")]
    InvalidIdentifier {
        /// The rejected input
        identifier: String,
        /// What was wrong with it
        reason: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O errors while loading or saving configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PathError {
    /// Create an invalid identifier error
    pub fn invalid_identifier(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        PathError::InvalidIdentifier {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        PathError::Internal(msg.into())
    }

    /// Check if this error was caused by the caller's input rather than the environment
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            PathError::InvalidIdentifier { .. } | PathError::InvalidConfiguration(_)
        )
    }
}
