//! Error taxonomy for log extraction and trial aggregation.

use std::path::PathBuf;

/// dgeval errors.
///
/// Everything here aborts the aggregation. A missing best-model marker is
/// only an error under [`AveragePolicy::Strict`](crate::AveragePolicy::Strict);
/// otherwise it is reported as a warning and the trial contributes zeros.
#[derive(Debug, thiserror::Error)]
pub enum DgEvalError {
    #[error("log file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no best-model marker in {}", path.display())]
    MarkerNotFound { path: PathBuf },

    #[error("best-model marker is the last line of {}; no metrics line follows", path.display())]
    MissingMetricsLine { path: PathBuf },

    #[error("non-numeric token {token:?} on line {line} of {}", path.display())]
    MalformedMetricsLine {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("metrics line after the best-model marker is empty in {}", path.display())]
    EmptyMetrics { path: PathBuf },

    #[error("metric width mismatch in {}: expected {expected}, got {actual}", path.display())]
    LengthMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("no trial logs supplied")]
    NoTrials,

    #[error("none of the {trials} trial logs contain a best-model marker")]
    NoTrialData { trials: usize },

    #[error("column {index} for domain {domain:?} is out of range for a vector of width {width}")]
    ColumnOutOfRange {
        domain: String,
        index: usize,
        width: usize,
    },

    #[error("invalid column layout: {0}")]
    InvalidLayout(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for dgeval operations.
pub type Result<T> = std::result::Result<T, DgEvalError>;
