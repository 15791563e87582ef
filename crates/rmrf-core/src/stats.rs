//! Deletion statistics.

use serde::{Deserialize, Serialize};

use crate::error::ItemError;

/// Result of a deletion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStats {
    /// Files removed (or that would be removed in a dry run).
    pub files_deleted: u64,
    /// Directories removed (or that would be removed in a dry run).
    pub dirs_deleted: u64,
    /// Per-item errors, in the order they were recorded.
    pub errors: Vec<ItemError>,
    /// The run was interrupted before it finished.
    #[serde(default)]
    pub cancelled: bool,
}

impl DeleteStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total entries removed.
    pub fn total_deleted(&self) -> u64 {
        self.files_deleted + self.dirs_deleted
    }

    /// No errors or notices were recorded and the run was not interrupted.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && !self.cancelled
    }

    /// Number of recorded errors that are real failures.
    pub fn failure_count(&self) -> usize {
        self.errors.iter().filter(|e| e.kind.is_failure()).count()
    }
}
