use crate::core::types::Source;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllpacError {
    /// Package absent from the record store or from a backend catalog
    #[error("Not found: {0}")]
    NotFound(String),

    /// Subprocess or network failure while talking to a backend
    #[error("{backend} error: {message}")]
    Backend { backend: Source, message: String },

    /// Package list could not be read or written
    #[error("Package list error at '{path}': {reason}")]
    Persistence { path: PathBuf, reason: String },

    /// Several backends matched and no usable choice was made
    #[error("Ambiguous selection: {0}")]
    AmbiguousSelection(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error at '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error("System command '{command}' failed: {reason}")]
    SystemCommandFailed { command: String, reason: String },

    #[error("Invalid package name: {0}")]
    InvalidPackageName(String),

    /// Lock acquisition failed (another process, or a poisoned mutex)
    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    /// Path resolution or validation error
    #[error("Path error: {0}")]
    PathError(String),

    #[error("Operation interrupted by user")]
    Interrupted,

    /// Some items of a batch operation failed; each was already reported
    #[error("{failed} of {total} package operation(s) did not succeed")]
    BatchFailed { failed: usize, total: usize },

    #[error("{0}")]
    Other(String),
}

impl AllpacError {
    pub fn backend(backend: Source, message: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            message: message.into(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, AllpacError>;
