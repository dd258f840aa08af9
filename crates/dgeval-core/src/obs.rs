//! Structured observability hooks for trial aggregation.
//!
//! This module provides:
//! - Trial-scoped tracing spans via the `TrialSpan` RAII guard
//! - Emission functions for the aggregation lifecycle: log read, marker
//!   missing, trial parsed, aggregation finished
//!
//! Events are emitted at `info!` level unless noted (filter via `RUST_LOG`).

use std::path::Path;

use tracing::{debug, info, warn};

use crate::aggregate::AveragePolicy;

/// RAII guard that enters a span tagged with the trial log path.
///
/// # Example
///
/// ```ignore
/// let _span = TrialSpan::enter(Path::new("t123_s0/out.txt"));
/// // every event below carries log = "t123_s0/out.txt"
/// ```
pub struct TrialSpan {
    _span: tracing::span::EnteredSpan,
}

impl TrialSpan {
    /// Create and enter a span tagged with the log path.
    pub fn enter(log_path: &Path) -> Self {
        let span = tracing::info_span!("dgeval.trial", log = %log_path.display());
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a log file was read into memory (debug level).
pub fn emit_log_read(log_path: &Path, lines: usize) {
    debug!(event = "log.read", log = %log_path.display(), lines = lines);
}

/// Emit event: the log has no best-model checkpoint (warning level).
pub fn emit_marker_missing(log_path: &Path) {
    warn!(
        event = "log.marker_missing",
        log = %log_path.display(),
        "no 'Best model upto now' found"
    );
}

/// Emit event: the best-model metrics of one trial were parsed.
pub fn emit_trial_parsed(log_path: &Path, line: usize, width: usize) {
    info!(
        event = "trial.parsed",
        log = %log_path.display(),
        line = line,
        width = width,
    );
}

/// Emit event: aggregation finished.
pub fn emit_aggregate_finished(trials: usize, parsed: usize, width: usize, policy: AveragePolicy) {
    info!(
        event = "aggregate.finished",
        trials = trials,
        parsed = parsed,
        width = width,
        policy = %policy,
    );
}
