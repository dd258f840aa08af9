//! Global atomic counters for aggregation runs.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a CLI run).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    logs_read: AtomicU64,
    markers_missing: AtomicU64,
    trials_averaged: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            logs_read: AtomicU64::new(0),
            markers_missing: AtomicU64::new(0),
            trials_averaged: AtomicU64::new(0),
        }
    }

    /// Increment the logs-read counter by one.
    pub fn inc_logs_read(&self) {
        self.logs_read.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "logs_read", "counter incremented");
    }

    /// Increment the markers-missing counter by one.
    pub fn inc_markers_missing(&self) {
        self.markers_missing.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "markers_missing", "counter incremented");
    }

    /// Add the number of trials that went into one average.
    pub fn add_trials_averaged(&self, n: u64) {
        self.trials_averaged.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "trials_averaged", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            logs_read = self.logs_read(),
            markers_missing = self.markers_missing(),
            trials_averaged = self.trials_averaged(),
        );
    }

    pub fn logs_read(&self) -> u64 {
        self.logs_read.load(Ordering::Relaxed)
    }

    pub fn markers_missing(&self) -> u64 {
        self.markers_missing.load(Ordering::Relaxed)
    }

    pub fn trials_averaged(&self) -> u64 {
        self.trials_averaged.load(Ordering::Relaxed)
    }
}
