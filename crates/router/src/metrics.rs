//! Router metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single router
#[derive(Debug, Default)]
pub struct RouterMetrics {
    /// Records delivered to a writer
    dispatched: AtomicU64,
    /// Failed write attempts (each triggers a failover or exhaustion)
    failed_attempts: AtomicU64,
    /// Successful advances to a lower-priority writer
    failovers: AtomicU64,
    /// Fatal exhaustions (no enabled writer left in a category)
    exhausted: AtomicU64,
    /// Records dropped for empty channel/fields or an unrouted channel
    dropped: AtomicU64,
}

impl RouterMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get dispatched record count
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Add to dispatched record count
    pub fn add_dispatched(&self, count: u64) {
        self.dispatched.fetch_add(count, Ordering::Relaxed);
    }

    /// Get failed attempt count
    pub fn failed_attempts(&self) -> u64 {
        self.failed_attempts.load(Ordering::Relaxed)
    }

    /// Increment failed attempt count
    pub fn inc_failed_attempts(&self) {
        self.failed_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failover count
    pub fn failovers(&self) -> u64 {
        self.failovers.load(Ordering::Relaxed)
    }

    /// Increment failover count
    pub fn inc_failovers(&self) {
        self.failovers.fetch_add(1, Ordering::Relaxed);
    }

    /// Get exhaustion count
    pub fn exhausted(&self) -> u64 {
        self.exhausted.load(Ordering::Relaxed)
    }

    /// Increment exhaustion count
    pub fn inc_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get dropped record count
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Increment dropped record count
    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatched: self.dispatched(),
            failed_attempts: self.failed_attempts(),
            failovers: self.failovers(),
            exhausted: self.exhausted(),
            dropped: self.dropped(),
        }
    }
}

/// Snapshot of router metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub dispatched: u64,
    pub failed_attempts: u64,
    pub failovers: u64,
    pub exhausted: u64,
    pub dropped: u64,
}
