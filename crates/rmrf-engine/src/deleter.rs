//! Concurrent post-order tree deletion.

use std::path::Path;

use rayon::ThreadPoolBuilder;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use rmrf_core::{DeleteConfig, DeleteError, DeleteStats, ItemError, ItemErrorKind};

use crate::fs::{EntryKind, Filesystem, StdFilesystem};
use crate::limiter::ConcurrencyLimiter;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::stats::StatsCollector;
use crate::validator::PathValidator;
use crate::PROGRESS_CHANNEL_SIZE;

/// Deletes a directory tree with bounded parallelism.
///
/// Every subdirectory either gets its own task, when the limiter has a free
/// permit, or is processed inline by its parent. A directory is removed only
/// after all of its children have finished.
pub struct TreeDeleter<F = StdFilesystem> {
    config: DeleteConfig,
    fs: F,
    limiter: ConcurrencyLimiter,
    cancel: CancellationToken,
    progress_tx: broadcast::Sender<ProgressEvent>,
}

impl TreeDeleter<StdFilesystem> {
    /// Create a deleter operating on the real filesystem.
    pub fn new(config: DeleteConfig) -> Self {
        Self::with_filesystem(config, StdFilesystem)
    }
}

impl<F: Filesystem> TreeDeleter<F> {
    /// Create a deleter with a custom filesystem backend.
    pub fn with_filesystem(config: DeleteConfig, fs: F) -> Self {
        let (progress_tx, _) = broadcast::channel(PROGRESS_CHANNEL_SIZE);
        Self {
            limiter: ConcurrencyLimiter::new(config.concurrency()),
            config,
            fs,
            cancel: CancellationToken::new(),
            progress_tx,
        }
    }

    /// Use an externally controlled cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Subscribe to progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress_tx.subscribe()
    }

    /// The permit pool bounding subtree tasks.
    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub fn config(&self) -> &DeleteConfig {
        &self.config
    }

    /// Delete `path` and everything below it.
    ///
    /// Root-level failures are returned before anything is touched. Once the
    /// root is accepted the call always runs to completion (or cancellation)
    /// and reports per-item failures in the returned stats.
    pub fn delete(&self, path: impl AsRef<Path>) -> Result<DeleteStats, DeleteError> {
        let root = PathValidator::new(&self.config).validate(path.as_ref())?;

        info!(
            path = %root.path.display(),
            dry_run = self.config.dry_run,
            max_concurrency = self.limiter.capacity(),
            "Starting deletion"
        );

        let run = DeleteRun {
            config: &self.config,
            fs: &self.fs,
            limiter: &self.limiter,
            cancel: &self.cancel,
            stats: StatsCollector::new(),
            progress: ProgressReporter::new(self.progress_tx.clone()),
        };

        if !self.cancel.is_cancelled() {
            match root.kind {
                EntryKind::Directory => {
                    let pool = ThreadPoolBuilder::new()
                        .num_threads(self.limiter.capacity())
                        .thread_name(|i| format!("rmrf-worker-{i}"))
                        .build()
                        .map_err(|e| DeleteError::WorkerPool {
                            message: e.to_string(),
                        })?;

                    pool.install(|| {
                        // The root task counts against the limit like any other.
                        let _permit = self.limiter.try_acquire();
                        run.delete_dir(&root.path);
                    });
                }
                EntryKind::Symlink => {
                    run.progress.add_total(1);
                    run.delete_link(&root.path);
                    run.progress.update(1);
                }
                EntryKind::File | EntryKind::Other => {
                    run.progress.add_total(1);
                    run.delete_file(&root.path);
                    run.progress.update(1);
                }
            }
        }

        let elapsed = run.progress.complete();
        if self.cancel.is_cancelled() {
            run.stats.mark_cancelled();
        }

        let stats = run.stats.into_stats();
        info!(
            files = stats.files_deleted,
            dirs = stats.dirs_deleted,
            errors = stats.errors.len(),
            cancelled = stats.cancelled,
            elapsed_ms = elapsed.as_millis() as u64,
            "Deletion finished"
        );
        Ok(stats)
    }
}

/// State shared by every task of one `delete` call.
struct DeleteRun<'a, F> {
    config: &'a DeleteConfig,
    fs: &'a F,
    limiter: &'a ConcurrencyLimiter,
    cancel: &'a CancellationToken,
    stats: StatsCollector,
    progress: ProgressReporter,
}

impl<F: Filesystem> DeleteRun<'_, F> {
    /// Empty a directory, then remove it.
    fn delete_dir(&self, dir: &Path) {
        if self.cancel.is_cancelled() {
            return;
        }

        if !self.config.dry_run {
            if let Err(e) = self.fs.make_dir_writable(dir) {
                self.stats
                    .add_error(ItemError::io(dir, ItemErrorKind::PermissionAdjust, &e));
            }
        }

        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.stats
                    .add_error(ItemError::io(dir, ItemErrorKind::Read, &e));
                return;
            }
        };
        trace!(path = %dir.display(), entries = entries.len(), "Listed directory");
        self.progress.add_total(entries.len() as u64);

        // The scope is the completion barrier for everything dispatched here.
        rayon::scope(|scope| {
            for entry in entries {
                if self.cancel.is_cancelled() {
                    debug!(path = %dir.display(), "Cancelled, not dispatching further entries");
                    break;
                }

                match entry.kind {
                    EntryKind::Directory => match self.limiter.try_acquire() {
                        Some(permit) => scope.spawn(move |_| {
                            let _permit = permit;
                            self.delete_dir(&entry.path);
                            self.progress.update(1);
                        }),
                        None => {
                            self.delete_dir(&entry.path);
                            self.progress.update(1);
                        }
                    },
                    EntryKind::Symlink => {
                        self.delete_link(&entry.path);
                        self.progress.update(1);
                    }
                    EntryKind::File | EntryKind::Other => {
                        self.delete_file(&entry.path);
                        self.progress.update(1);
                    }
                }
            }
        });

        // Children may have stopped early; leave the directory in place.
        if self.cancel.is_cancelled() {
            return;
        }

        if self.config.dry_run {
            self.stats.record_dir();
            return;
        }

        match self.fs.remove_dir(dir) {
            Ok(()) => {
                trace!(path = %dir.display(), "Removed directory");
                self.stats.record_dir();
            }
            Err(e) => self
                .stats
                .add_error(ItemError::io(dir, ItemErrorKind::Remove, &e)),
        }
    }

    /// Make a file writable and remove it.
    fn delete_file(&self, path: &Path) {
        if self.config.dry_run {
            self.stats.record_file();
            return;
        }

        if let Err(e) = self.fs.make_file_writable(path) {
            self.stats
                .add_error(ItemError::io(path, ItemErrorKind::PermissionAdjust, &e));
            return;
        }

        match self.fs.remove_file(path) {
            Ok(()) => self.stats.record_file(),
            Err(e) => self
                .stats
                .add_error(ItemError::io(path, ItemErrorKind::Remove, &e)),
        }
    }

    /// Skip a symbolic link, or remove the link itself and never its target.
    fn delete_link(&self, path: &Path) {
        if self.config.skip_symlinks {
            self.stats.add_error(ItemError::symlink_skipped(path));
            return;
        }
        if self.config.dry_run {
            self.stats.record_file();
            return;
        }

        match self.fs.remove_file(path) {
            Ok(()) => self.stats.record_file(),
            Err(e) => self
                .stats
                .add_error(ItemError::io(path, ItemErrorKind::Remove, &e)),
        }
    }
}
