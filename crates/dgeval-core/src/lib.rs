//! dgeval Core Library
//!
//! Averages the last best-model metrics of domain-generalization training
//! runs across trial seeds and summarizes them as in-distribution score,
//! out-of-distribution average and domain gap.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod layout;
pub mod metrics;
pub mod obs;
pub mod summary;
pub mod telemetry;
pub mod trial;

pub use aggregate::{
    average_over_trials, average_with_policy, AggregateResult, AveragePolicy, TrialAccumulator,
};
pub use config::AggregatorConfig;
pub use error::{DgEvalError, Result};
pub use extract::{
    extract_best_metrics, parse_best_metrics, BestMetrics, Extraction, MetricVector,
    BEST_MODEL_MARKER,
};
pub use layout::{ColumnLayout, DomainColumn};
pub use summary::{format_score, round2, summarize, summarize_values, DomainScore, Summary};
pub use trial::{locate_trial_logs, TrialLayout, DEFAULT_SEEDS};

pub use metrics::METRICS;
pub use obs::{
    emit_aggregate_finished, emit_log_read, emit_marker_missing, emit_trial_parsed, TrialSpan,
};
pub use telemetry::init_tracing;

/// dgeval version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
