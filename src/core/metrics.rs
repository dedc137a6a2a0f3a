//! Sink metrics for observability
//!
//! Counters for monitoring delivery health: how many entries were buffered,
//! filtered or dropped on overflow, and how many made it to the endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for sink observability
///
/// # Example
///
/// ```
/// use rust_logtail_sink::SinkMetrics;
///
/// let metrics = SinkMetrics::new();
///
/// metrics.record_accepted();
/// metrics.record_batch_sent(1);
///
/// assert_eq!(metrics.entries_accepted(), 1);
/// assert_eq!(metrics.entries_delivered(), 1);
/// ```
#[derive(Debug)]
pub struct SinkMetrics {
    /// Entries taken by a handler, whether buffered or sent immediately
    entries_accepted: AtomicU64,

    /// Entries rejected by the level filter
    entries_filtered: AtomicU64,

    /// Entries dropped because the buffer was full
    entries_dropped: AtomicU64,

    /// Entries carried by successful requests
    entries_delivered: AtomicU64,

    /// Entries carried by failed requests
    entries_lost: AtomicU64,

    batches_sent: AtomicU64,
    batches_failed: AtomicU64,
}

impl SinkMetrics {
    pub const fn new() -> Self {
        Self {
            entries_accepted: AtomicU64::new(0),
            entries_filtered: AtomicU64::new(0),
            entries_dropped: AtomicU64::new(0),
            entries_delivered: AtomicU64::new(0),
            entries_lost: AtomicU64::new(0),
            batches_sent: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn entries_accepted(&self) -> u64 {
        self.entries_accepted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn entries_filtered(&self) -> u64 {
        self.entries_filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn entries_dropped(&self) -> u64 {
        self.entries_dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn entries_delivered(&self) -> u64 {
        self.entries_delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn entries_lost(&self) -> u64 {
        self.entries_lost.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn batches_sent(&self) -> u64 {
        self.batches_sent.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn batches_failed(&self) -> u64 {
        self.batches_failed.load(Ordering::Relaxed)
    }

    /// Record an accepted entry
    #[inline]
    pub fn record_accepted(&self) -> u64 {
        self.entries_accepted.fetch_add(1, Ordering::Relaxed)
    }

    /// Record an entry below the level threshold
    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.entries_filtered.fetch_add(1, Ordering::Relaxed)
    }

    /// Record an entry dropped on overflow, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.entries_dropped.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a delivered batch of `entries` entries
    #[inline]
    pub fn record_batch_sent(&self, entries: usize) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
        self.entries_delivered
            .fetch_add(entries as u64, Ordering::Relaxed);
    }

    /// Record a failed batch of `entries` entries
    #[inline]
    pub fn record_batch_failed(&self, entries: usize) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.entries_lost.fetch_add(entries as u64, Ordering::Relaxed);
    }

    /// Share of accepted-and-attempted entries that never arrived, as a
    /// percentage (0.0 - 100.0). Overflow drops count as lost.
    ///
    /// Returns 0.0 if nothing has been attempted.
    pub fn loss_rate(&self) -> f64 {
        let lost = (self.entries_lost() + self.entries_dropped()) as f64;
        let total = self.entries_delivered() as f64 + lost;
        if total == 0.0 {
            0.0
        } else {
            (lost / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.entries_accepted.store(0, Ordering::Relaxed);
        self.entries_filtered.store(0, Ordering::Relaxed);
        self.entries_dropped.store(0, Ordering::Relaxed);
        self.entries_delivered.store(0, Ordering::Relaxed);
        self.entries_lost.store(0, Ordering::Relaxed);
        self.batches_sent.store(0, Ordering::Relaxed);
        self.batches_failed.store(0, Ordering::Relaxed);
    }
}

impl Default for SinkMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SinkMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            entries_accepted: AtomicU64::new(self.entries_accepted()),
            entries_filtered: AtomicU64::new(self.entries_filtered()),
            entries_dropped: AtomicU64::new(self.entries_dropped()),
            entries_delivered: AtomicU64::new(self.entries_delivered()),
            entries_lost: AtomicU64::new(self.entries_lost()),
            batches_sent: AtomicU64::new(self.batches_sent()),
            batches_failed: AtomicU64::new(self.batches_failed()),
        }
    }
}
