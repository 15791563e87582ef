//! Error types for deletion runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that stop a deletion before anything is touched.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// Root matches an entry of the dangerous path list.
    #[error("Refusing to delete dangerous path: {path}")]
    DangerousPath { path: PathBuf },

    /// Root cannot be stat'd.
    #[error("Path does not exist: {path}")]
    NotExist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root cannot be turned into an absolute or canonical path.
    #[error("Cannot resolve path {path}: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Worker pool could not be started.
    #[error("Failed to start worker pool: {message}")]
    WorkerPool { message: String },
}

impl DeleteError {
    /// Whether the root was rejected by the safety check.
    pub fn is_dangerous(&self) -> bool {
        matches!(self, Self::DangerousPath { .. })
    }
}

/// Kind of per-item error recorded during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemErrorKind {
    /// Directory listing failed; the subtree was abandoned.
    Read,
    /// Making an entry writable failed.
    PermissionAdjust,
    /// Removing a file or directory failed.
    Remove,
    /// Symbolic link left in place.
    SymlinkSkipped,
}

impl ItemErrorKind {
    /// Informational kinds are not counted as failures.
    pub fn is_failure(self) -> bool {
        !matches!(self, Self::SymlinkSkipped)
    }
}

impl std::fmt::Display for ItemErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read failed"),
            Self::PermissionAdjust => write!(f, "chmod failed"),
            Self::Remove => write!(f, "remove failed"),
            Self::SymlinkSkipped => write!(f, "skipped symlink"),
        }
    }
}

/// A non-fatal error tied to a single path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    /// Path the error occurred on.
    pub path: PathBuf,
    /// What went wrong.
    pub kind: ItemErrorKind,
    /// Human-readable cause.
    pub message: String,
}

impl ItemError {
    /// Create a new item error.
    pub fn new(path: impl Into<PathBuf>, kind: ItemErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Create an error from an I/O failure.
    pub fn io(path: impl Into<PathBuf>, kind: ItemErrorKind, source: &std::io::Error) -> Self {
        Self::new(path, kind, source.to_string())
    }

    /// Create a skipped-symlink notice.
    pub fn symlink_skipped(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ItemErrorKind::SymlinkSkipped, "not followed")
    }
}

impl std::fmt::Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.kind, self.path.display(), self.message)
    }
}
