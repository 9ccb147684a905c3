//! Concurrency gate bounding how many jobs run at once.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Smallest accepted concurrency limit.
pub const MIN_CONCURRENCY: usize = 1;
/// Largest accepted concurrency limit.
pub const MAX_CONCURRENCY: usize = 20;

/// Error type for gate operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Limit outside the accepted range.
    #[error("Concurrency must be between {min} and {max}, got {limit}")]
    InvalidLimit { limit: usize, min: usize, max: usize },

    /// The gate was closed while waiting.
    #[error("Concurrency gate closed")]
    Closed,
}

#[derive(Debug, Default)]
struct GateCounters {
    active: AtomicUsize,
    peak: AtomicUsize,
    waiting: AtomicUsize,
    acquisitions: AtomicU64,
}

/// Snapshot of gate instrumentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateStats {
    /// Configured limit.
    pub limit: usize,
    /// Permits currently held.
    pub active: usize,
    /// Highest number of permits held at once.
    pub peak: usize,
    /// Tasks currently waiting for a permit.
    pub waiting: usize,
    /// Total permits handed out.
    pub acquisitions: u64,
}

/// Counting gate backed by a tokio semaphore.
///
/// Cloning yields another handle to the same gate.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    limit: usize,
    counters: Arc<GateCounters>,
}

impl ConcurrencyGate {
    /// Creates a gate admitting at most `limit` holders.
    pub fn new(limit: usize) -> Result<Self, GateError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&limit) {
            return Err(GateError::InvalidLimit {
                limit,
                min: MIN_CONCURRENCY,
                max: MAX_CONCURRENCY,
            });
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            counters: Arc::new(GateCounters::default()),
        })
    }

    /// Waits for a permit. The permit is released when dropped.
    pub async fn acquire(&self) -> Result<GatePermit, GateError> {
        self.counters.waiting.fetch_add(1, Ordering::Relaxed);
        let permit = Arc::clone(&self.semaphore).acquire_owned().await;
        self.counters.waiting.fetch_sub(1, Ordering::Relaxed);
        let permit = permit.map_err(|_| GateError::Closed)?;

        let active = self.counters.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(active, Ordering::SeqCst);
        self.counters.acquisitions.fetch_add(1, Ordering::Relaxed);

        Ok(GatePermit {
            _permit: permit,
            counters: Arc::clone(&self.counters),
        })
    }

    /// Configured limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits currently held.
    pub fn active(&self) -> usize {
        self.counters.active.load(Ordering::SeqCst)
    }

    /// Highest number of permits held at once.
    pub fn peak(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }

    /// Total permits handed out.
    pub fn acquisitions(&self) -> u64 {
        self.counters.acquisitions.load(Ordering::Relaxed)
    }

    /// Current instrumentation snapshot.
    pub fn stats(&self) -> GateStats {
        GateStats {
            limit: self.limit,
            active: self.active(),
            peak: self.peak(),
            waiting: self.counters.waiting.load(Ordering::Relaxed),
            acquisitions: self.acquisitions(),
        }
    }
}

/// Proof of admission through a [`ConcurrencyGate`].
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<GateCounters>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.counters.active.fetch_sub(1, Ordering::SeqCst);
    }
}
