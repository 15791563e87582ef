//! Concurrent tree-deletion engine for rmrf.
//!
//! This crate removes a directory tree with bounded parallelism using a
//! rayon worker pool.
//!
//! # Overview
//!
//! `rmrf-engine` validates the root, walks the tree and removes it
//! bottom-up. Key features:
//!
//! - **Safety gate** refusing dangerous roots (`/`, `/etc`, ...)
//! - **Bounded parallelism** via a non-blocking permit pool with inline fallback
//! - **Post-order removal**: a directory goes only after all its children
//! - **Dry runs** that count without mutating anything
//! - **Progress updates** via broadcast channels
//! - **Cancellation** through a `CancellationToken`
//!
//! # Example
//!
//! ```rust,no_run
//! use rmrf_engine::{DeleteConfig, TreeDeleter};
//!
//! let config = DeleteConfig::builder().dry_run(true).build().unwrap();
//! let deleter = TreeDeleter::new(config);
//! let stats = deleter.delete("/tmp/build-cache").unwrap();
//!
//! println!("{} files, {} directories", stats.files_deleted, stats.dirs_deleted);
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use rmrf_engine::{DeleteConfig, ProgressEvent, TreeDeleter};
//!
//! let deleter = TreeDeleter::new(DeleteConfig::new());
//! let mut progress_rx = deleter.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(ProgressEvent::Update(p)) = progress_rx.blocking_recv() {
//!         println!("{}/{}", p.processed, p.total);
//!     }
//! });
//! ```

mod deleter;
mod fs;
mod limiter;
mod progress;
mod stats;
mod validator;

pub use deleter::TreeDeleter;
pub use fs::{DirEntryInfo, EntryKind, Filesystem, StdFilesystem};
pub use limiter::{ConcurrencyLimiter, Permit};
pub use progress::{DEFAULT_PUBLISH_INTERVAL, ProgressEvent, ProgressReporter, ProgressSnapshot};
pub use stats::StatsCollector;
pub use validator::{PathValidator, ValidatedPath};

// Re-export core types for convenience
pub use rmrf_core::{DeleteConfig, DeleteError, DeleteStats, ItemError, ItemErrorKind};

/// Capacity of the progress broadcast channel.
pub const PROGRESS_CHANNEL_SIZE: usize = 100;
