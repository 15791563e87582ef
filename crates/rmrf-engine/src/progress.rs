//! Deletion progress reporting.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{info, trace};

/// Default minimum time between two published snapshots.
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_millis(100);

/// Consistent view of the progress counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Entries discovered so far. Grows during traversal.
    pub total: u64,
    /// Entries handled so far.
    pub processed: u64,
    /// Time since the run started.
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Entries left, never negative.
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.processed)
    }

    /// Entries per second, unavailable until time has passed and work was done.
    pub fn rate(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if secs <= f64::EPSILON || self.processed == 0 {
            return None;
        }
        Some(self.processed as f64 / secs)
    }

    /// Estimated time left at the current rate.
    pub fn eta(&self) -> Option<Duration> {
        let rate = self.rate()?;
        Duration::try_from_secs_f64(self.remaining() as f64 / rate).ok()
    }

    /// Completion ratio in percent, unavailable while nothing is known.
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some((self.processed.min(self.total) as f64 / self.total as f64) * 100.0)
    }
}

/// Event published to progress subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    Update(ProgressSnapshot),
    Complete(ProgressSnapshot),
}

#[derive(Debug)]
struct ProgressState {
    total: u64,
    processed: u64,
    last_publish: Option<Instant>,
}

/// Tracks discovered versus processed entries for one run.
///
/// Both counters sit behind one lock so every snapshot reads them as a pair.
/// Output is observational only.
#[derive(Debug)]
pub struct ProgressReporter {
    state: Mutex<ProgressState>,
    start: Instant,
    interval: Duration,
    tx: Option<broadcast::Sender<ProgressEvent>>,
}

impl ProgressReporter {
    /// Create a reporter publishing to `tx`.
    pub fn new(tx: broadcast::Sender<ProgressEvent>) -> Self {
        Self::build(Some(tx))
    }

    /// Create a reporter that only keeps counters.
    pub fn detached() -> Self {
        Self::build(None)
    }

    fn build(tx: Option<broadcast::Sender<ProgressEvent>>) -> Self {
        Self {
            state: Mutex::new(ProgressState {
                total: 0,
                processed: 0,
                last_publish: None,
            }),
            start: Instant::now(),
            interval: DEFAULT_PUBLISH_INTERVAL,
            tx,
        }
    }

    /// Set the minimum time between published updates.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register newly discovered entries.
    pub fn add_total(&self, count: u64) {
        self.lock().total += count;
    }

    /// Advance the processed counter and publish if the interval elapsed.
    pub fn update(&self, delta: u64) -> ProgressSnapshot {
        let now = Instant::now();
        let (snapshot, publish) = {
            let mut state = self.lock();
            state.processed += delta;
            let publish = state
                .last_publish
                .is_none_or(|last| now.duration_since(last) >= self.interval);
            if publish {
                state.last_publish = Some(now);
            }
            (
                ProgressSnapshot {
                    total: state.total,
                    processed: state.processed,
                    elapsed: now.duration_since(self.start),
                },
                publish,
            )
        };

        if publish {
            trace!(
                processed = snapshot.processed,
                total = snapshot.total,
                rate = ?snapshot.rate(),
                eta = ?snapshot.eta(),
                "Progress"
            );
            self.send(ProgressEvent::Update(snapshot));
        }
        snapshot
    }

    /// Current counters.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.lock();
        ProgressSnapshot {
            total: state.total,
            processed: state.processed,
            elapsed: self.start.elapsed(),
        }
    }

    /// Publish the final snapshot and return the total elapsed time.
    pub fn complete(&self) -> Duration {
        let snapshot = self.snapshot();
        info!(
            processed = snapshot.processed,
            elapsed_ms = snapshot.elapsed.as_millis() as u64,
            "Completed"
        );
        self.send(ProgressEvent::Complete(snapshot));
        snapshot.elapsed
    }

    fn send(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            // No subscribers is fine.
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_elapsed_has_no_rate() {
        let snapshot = ProgressSnapshot {
            total: 10,
            processed: 5,
            elapsed: Duration::ZERO,
        };
        assert_eq!(snapshot.rate(), None);
        assert_eq!(snapshot.eta(), None);
    }

    #[test]
    fn test_nothing_processed_has_no_rate() {
        let snapshot = ProgressSnapshot {
            total: 10,
            processed: 0,
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(snapshot.rate(), None);
        assert_eq!(snapshot.eta(), None);
        assert_eq!(snapshot.percentage(), Some(0.0));
    }

    #[test]
    fn test_rate_and_eta() {
        let snapshot = ProgressSnapshot {
            total: 30,
            processed: 10,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(snapshot.rate(), Some(5.0));
        assert_eq!(snapshot.eta(), Some(Duration::from_secs(4)));
    }

    #[test]
    fn test_processed_ahead_of_total() {
        // Total is revised concurrently, so it can briefly lag.
        let snapshot = ProgressSnapshot {
            total: 3,
            processed: 5,
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(snapshot.remaining(), 0);
        assert_eq!(snapshot.eta(), Some(Duration::ZERO));
        assert_eq!(snapshot.percentage(), Some(100.0));
    }

    #[test]
    fn test_first_update_published_then_throttled() {
        let (tx, mut rx) = broadcast::channel(16);
        let reporter = ProgressReporter::new(tx).with_interval(Duration::from_secs(3600));
        reporter.add_total(3);
        reporter.update(1);
        reporter.update(1);
        reporter.update(1);
        reporter.complete();

        let first = rx.try_recv().unwrap();
        assert!(matches!(first, ProgressEvent::Update(s) if s.processed == 1));
        let last = rx.try_recv().unwrap();
        assert!(matches!(last, ProgressEvent::Complete(s) if s.processed == 3 && s.total == 3));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_detached_reporter_counts() {
        let reporter = ProgressReporter::detached();
        reporter.add_total(2);
        reporter.update(2);
        let snapshot = reporter.snapshot();
        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.processed, 2);
    }
}
