//! Error types for agrocam-tools

use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// Tool not found
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Tool execution failed
    #[error("execution failed: {0}")]
    Execution(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Permission denied
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

impl From<agrocam_data::Error> for Error {
    fn from(err: agrocam_data::Error) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
