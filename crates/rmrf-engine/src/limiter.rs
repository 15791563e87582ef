//! Fixed-capacity permit pool for subtree tasks.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Semaphore, SemaphorePermit};

/// Bounds how many subtree tasks run at once.
///
/// Acquisition never blocks: a caller that gets no permit is expected to do
/// the work itself instead of waiting, so a parent holding a permit can never
/// starve its own children.
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Semaphore,
    capacity: usize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

/// A held slot. Released on drop.
#[derive(Debug)]
pub struct Permit<'a> {
    limiter: &'a ConcurrencyLimiter,
    _permit: SemaphorePermit<'a>,
}

impl ConcurrencyLimiter {
    /// Create a limiter with the given capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Take a permit if one is free.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        let permit = self.semaphore.try_acquire().ok()?;
        let active = self.active.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(active, Ordering::AcqRel);
        Some(Permit {
            limiter: self,
            _permit: permit,
        })
    }

    /// Maximum number of permits.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently held.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Highest number of permits held at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(rmrf_core::default_max_concurrency())
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        // Runs before the semaphore permit is returned, so `active` never
        // exceeds the number of semaphore permits handed out.
        self.limiter.active.fetch_sub(1, Ordering::AcqRel);
    }
}
