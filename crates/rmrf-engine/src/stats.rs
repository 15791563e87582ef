//! Thread-safe statistics aggregation.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rmrf_core::{DeleteStats, ItemError, ItemErrorKind};
use tracing::{debug, warn};

/// Shared aggregate written by every task of a deletion run.
///
/// A single lock guards all fields, so a snapshot never observes a
/// half-applied update.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inner: Mutex<DeleteStats>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DeleteStats> {
        // Counters stay meaningful even if a writer panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count one deleted file.
    pub fn record_file(&self) {
        self.lock().files_deleted += 1;
    }

    /// Count one deleted directory.
    pub fn record_dir(&self) {
        self.lock().dirs_deleted += 1;
    }

    /// Append a per-item error.
    pub fn add_error(&self, error: ItemError) {
        match error.kind {
            ItemErrorKind::SymlinkSkipped => {
                debug!(path = %error.path.display(), "Skipped symlink");
            }
            kind => {
                warn!(path = %error.path.display(), %kind, message = %error.message, "Deletion error");
            }
        }
        self.lock().errors.push(error);
    }

    /// Flag the run as interrupted.
    pub fn mark_cancelled(&self) {
        self.lock().cancelled = true;
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> DeleteStats {
        self.lock().clone()
    }

    /// Consume the collector and return the final stats.
    pub fn into_stats(self) -> DeleteStats {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
