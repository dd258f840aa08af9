//! Best-model metric extraction from training logs.
//!
//! A training log records a checkpoint as a line containing
//! [`BEST_MODEL_MARKER`] followed by a line of whitespace-separated floats.
//! Only the last checkpoint in the file is used.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DgEvalError, Result};
use crate::metrics::METRICS;
use crate::obs::{emit_log_read, emit_marker_missing, emit_trial_parsed, TrialSpan};

/// Substring identifying a best-model checkpoint line.
pub const BEST_MODEL_MARKER: &str = "Best model upto now";

/// Per-domain accuracies in the column order of the producing run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricVector(Vec<f64>);

impl MetricVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

/// Metrics following the last best-model marker.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMetrics {
    /// 1-based line number of the metrics line.
    pub line: usize,
    pub values: MetricVector,
}

/// Outcome of scanning one log.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found(BestMetrics),
    /// The log has no best-model checkpoint yet. Not an error.
    MarkerNotFound,
}

impl Extraction {
    pub fn metrics(&self) -> Option<&MetricVector> {
        match self {
            Extraction::Found(best) => Some(&best.values),
            Extraction::MarkerNotFound => None,
        }
    }

    pub fn into_metrics(self) -> Option<MetricVector> {
        match self {
            Extraction::Found(best) => Some(best.values),
            Extraction::MarkerNotFound => None,
        }
    }
}

/// Parse the last best-model metrics out of log contents.
///
/// `path` is only used for error reporting.
pub fn parse_best_metrics(contents: &str, path: &Path) -> Result<Extraction> {
    let lines: Vec<&str> = contents.lines().collect();

    let Some(marker_idx) = lines
        .iter()
        .rposition(|line| line.contains(BEST_MODEL_MARKER))
    else {
        return Ok(Extraction::MarkerNotFound);
    };

    let metrics_idx = marker_idx + 1;
    let metrics_line = lines
        .get(metrics_idx)
        .ok_or_else(|| DgEvalError::MissingMetricsLine {
            path: path.to_path_buf(),
        })?;

    let values = metrics_line
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| DgEvalError::MalformedMetricsLine {
                    path: path.to_path_buf(),
                    line: metrics_idx + 1,
                    token: token.to_string(),
                })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(Extraction::Found(BestMetrics {
        line: metrics_idx + 1,
        values: MetricVector(values),
    }))
}

/// Read one log and extract its last best-model metrics.
///
/// A log with no checkpoint yields [`Extraction::MarkerNotFound`] and a
/// warning. Missing files, unreadable files and non-numeric metrics are errors.
pub fn extract_best_metrics(log_path: &Path) -> Result<Extraction> {
    let _span = TrialSpan::enter(log_path);

    let contents = fs::read_to_string(log_path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => DgEvalError::FileNotFound {
            path: log_path.to_path_buf(),
        },
        _ => DgEvalError::Io {
            path: log_path.to_path_buf(),
            source,
        },
    })?;
    METRICS.inc_logs_read();
    emit_log_read(log_path, contents.lines().count());

    let extraction = parse_best_metrics(&contents, log_path)?;
    match &extraction {
        Extraction::Found(best) => emit_trial_parsed(log_path, best.line, best.values.len()),
        Extraction::MarkerNotFound => {
            METRICS.inc_markers_missing();
            emit_marker_missing(log_path);
        }
    }
    Ok(extraction)
}
