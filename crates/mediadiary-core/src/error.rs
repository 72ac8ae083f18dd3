//! Error types for media diary core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages. The read/write split matters: read failures
//! degrade to empty views, write failures always reach the caller.

use thiserror::Error;

/// Result type alias for media diary operations.
pub type Result<T> = std::result::Result<T, DiaryError>;

/// Core error type for media diary operations.
#[derive(Debug, Error)]
pub enum DiaryError {
    /// A read against the remote store (aggregate, preferences, chart query) failed
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// A preference write against the remote store failed
    #[error("Write failed: {0}")]
    Write(String),

    /// The identity provider refused or failed to sign out
    #[error("Sign-out failed: {0}")]
    SignOut(String),

    /// Data validation error, detected before any remote call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation needs a signed-in user
    #[error("No user is signed in")]
    NotSignedIn,

    /// Filter panel operation issued in the wrong state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DiaryError {
    /// Re-label a lower-level failure as a read failure.
    pub(crate) fn into_fetch(self) -> Self {
        match self {
            DiaryError::Fetch(_) | DiaryError::Validation(_) | DiaryError::NotSignedIn => self,
            other => DiaryError::Fetch(other.to_string()),
        }
    }

    /// Re-label a lower-level failure as a write failure.
    pub(crate) fn into_write(self) -> Self {
        match self {
            DiaryError::Write(_) | DiaryError::Validation(_) | DiaryError::NotSignedIn => self,
            other => DiaryError::Write(other.to_string()),
        }
    }
}

impl From<std::io::Error> for DiaryError {
    fn from(err: std::io::Error) -> Self {
        DiaryError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for DiaryError {
    fn from(err: serde_json::Error) -> Self {
        DiaryError::Storage(format!("Invalid document JSON: {}", err))
    }
}

impl From<rusqlite::Error> for DiaryError {
    fn from(err: rusqlite::Error) -> Self {
        DiaryError::Storage(format!("SQLite error: {}", err))
    }
}
