//! Cross-trial averaging of best-model metrics.
//!
//! The first parsed vector fixes the expected width. Trials without a
//! best-model checkpoint contribute zeros; whether they still count toward
//! the divisor is decided by [`AveragePolicy`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DgEvalError, Result};
use crate::extract::{extract_best_metrics, Extraction, MetricVector};
use crate::metrics::METRICS;
use crate::obs::emit_aggregate_finished;

/// How trials without a best-model checkpoint affect the mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AveragePolicy {
    /// Divide by the number of trial files supplied. A trial with no
    /// checkpoint adds zeros but still counts, pulling the mean down.
    #[default]
    FileCount,
    /// Divide by the number of trials that actually had a checkpoint.
    ParsedCount,
    /// Fail on the first trial without a checkpoint.
    Strict,
}

impl fmt::Display for AveragePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AveragePolicy::FileCount => "file-count",
            AveragePolicy::ParsedCount => "parsed-count",
            AveragePolicy::Strict => "strict",
        };
        f.write_str(s)
    }
}

/// Element-wise mean over a trial set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub values: MetricVector,
    /// Trial files supplied.
    pub trials: usize,
    /// Trials that had a best-model checkpoint.
    pub parsed: usize,
    /// Trials that had none.
    pub missing: Vec<PathBuf>,
    pub policy: AveragePolicy,
}

impl AggregateResult {
    pub fn width(&self) -> usize {
        self.values.len()
    }
}

/// Average trial logs with the default [`AveragePolicy::FileCount`].
pub fn average_over_trials<P: AsRef<Path>>(log_paths: &[P]) -> Result<AggregateResult> {
    average_with_policy(log_paths, AveragePolicy::default())
}

/// Average trial logs, reading each one with [`extract_best_metrics`].
pub fn average_with_policy<P: AsRef<Path>>(
    log_paths: &[P],
    policy: AveragePolicy,
) -> Result<AggregateResult> {
    let mut acc = TrialAccumulator::new(policy);
    for path in log_paths {
        let path = path.as_ref();
        acc.push(path, extract_best_metrics(path)?)?;
    }
    acc.finish()
}

/// Running element-wise sum over extracted trials.
///
/// Exposed so callers holding already-extracted results can average them
/// without going back to disk.
#[derive(Debug)]
pub struct TrialAccumulator {
    policy: AveragePolicy,
    sum: Option<Vec<f64>>,
    trials: usize,
    parsed: usize,
    missing: Vec<PathBuf>,
}

impl TrialAccumulator {
    pub fn new(policy: AveragePolicy) -> Self {
        Self {
            policy,
            sum: None,
            trials: 0,
            parsed: 0,
            missing: Vec::new(),
        }
    }

    /// Add one trial's extraction result.
    pub fn push(&mut self, path: &Path, extraction: Extraction) -> Result<()> {
        self.trials += 1;

        let Some(values) = extraction.into_metrics() else {
            if self.policy == AveragePolicy::Strict {
                return Err(DgEvalError::MarkerNotFound {
                    path: path.to_path_buf(),
                });
            }
            self.missing.push(path.to_path_buf());
            return Ok(());
        };

        match &mut self.sum {
            None => {
                if values.is_empty() {
                    return Err(DgEvalError::EmptyMetrics {
                        path: path.to_path_buf(),
                    });
                }
                self.sum = Some(values.into_inner());
            }
            Some(sum) => {
                if values.len() != sum.len() {
                    return Err(DgEvalError::LengthMismatch {
                        path: path.to_path_buf(),
                        expected: sum.len(),
                        actual: values.len(),
                    });
                }
                for (total, value) in sum.iter_mut().zip(values.values()) {
                    *total += value;
                }
            }
        }
        self.parsed += 1;
        Ok(())
    }

    /// Divide the running sum according to the policy.
    pub fn finish(self) -> Result<AggregateResult> {
        if self.trials == 0 {
            return Err(DgEvalError::NoTrials);
        }
        let sum = self.sum.ok_or(DgEvalError::NoTrialData {
            trials: self.trials,
        })?;

        let divisor = match self.policy {
            AveragePolicy::FileCount | AveragePolicy::Strict => self.trials,
            AveragePolicy::ParsedCount => self.parsed,
        } as f64;
        let values: Vec<f64> = sum.into_iter().map(|total| total / divisor).collect();

        METRICS.add_trials_averaged(self.trials as u64);
        emit_aggregate_finished(self.trials, self.parsed, values.len(), self.policy);

        Ok(AggregateResult {
            values: MetricVector::new(values),
            trials: self.trials,
            parsed: self.parsed,
            missing: self.missing,
            policy: self.policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::BestMetrics;

    fn found(values: &[f64]) -> Extraction {
        Extraction::Found(BestMetrics {
            line: 2,
            values: MetricVector::new(values.to_vec()),
        })
    }

    fn approx_eq(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn mean_over_all_trials() {
        let mut acc = TrialAccumulator::new(AveragePolicy::FileCount);
        acc.push(Path::new("a"), found(&[0.2, 0.4])).unwrap();
        acc.push(Path::new("b"), found(&[0.4, 0.8])).unwrap();
        let result = acc.finish().unwrap();
        approx_eq(result.values.values(), &[0.3, 0.6]);
        assert_eq!(result.trials, 2);
        assert_eq!(result.parsed, 2);
        assert!(result.missing.is_empty());
    }

    // Known quirk: a trial without a checkpoint still counts in the divisor.
    #[test]
    fn file_count_divides_by_all_files() {
        let mut acc = TrialAccumulator::new(AveragePolicy::FileCount);
        acc.push(Path::new("a"), found(&[0.9, 0.6])).unwrap();
        acc.push(Path::new("b"), Extraction::MarkerNotFound).unwrap();
        acc.push(Path::new("c"), found(&[0.9, 0.6])).unwrap();
        let result = acc.finish().unwrap();
        approx_eq(result.values.values(), &[0.6, 0.4]);
        assert_eq!(result.missing, vec![PathBuf::from("b")]);
    }

    #[test]
    fn missing_first_trial_does_not_fix_width() {
        let mut acc = TrialAccumulator::new(AveragePolicy::FileCount);
        acc.push(Path::new("a"), Extraction::MarkerNotFound).unwrap();
        acc.push(Path::new("b"), found(&[0.5, 0.5, 0.5])).unwrap();
        let result = acc.finish().unwrap();
        assert_eq!(result.width(), 3);
        approx_eq(result.values.values(), &[0.25, 0.25, 0.25]);
    }

    #[test]
    fn parsed_count_ignores_missing_trials() {
        let mut acc = TrialAccumulator::new(AveragePolicy::ParsedCount);
        acc.push(Path::new("a"), found(&[0.9])).unwrap();
        acc.push(Path::new("b"), Extraction::MarkerNotFound).unwrap();
        acc.push(Path::new("c"), found(&[0.7])).unwrap();
        let result = acc.finish().unwrap();
        approx_eq(result.values.values(), &[0.8]);
        assert_eq!(result.parsed, 2);
        assert_eq!(result.trials, 3);
    }

    #[test]
    fn strict_rejects_missing_marker() {
        let mut acc = TrialAccumulator::new(AveragePolicy::Strict);
        acc.push(Path::new("a"), found(&[0.9])).unwrap();
        let err = acc
            .push(Path::new("b"), Extraction::MarkerNotFound)
            .unwrap_err();
        assert!(matches!(err, DgEvalError::MarkerNotFound { path } if path == Path::new("b")));
    }

    #[test]
    fn width_mismatch_is_fatal() {
        let mut acc = TrialAccumulator::new(AveragePolicy::FileCount);
        acc.push(Path::new("a"), found(&[0.1, 0.2, 0.3])).unwrap();
        let err = acc.push(Path::new("b"), found(&[0.1, 0.2])).unwrap_err();
        assert!(matches!(
            err,
            DgEvalError::LengthMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn no_trials() {
        let acc = TrialAccumulator::new(AveragePolicy::FileCount);
        assert!(matches!(acc.finish(), Err(DgEvalError::NoTrials)));
    }

    #[test]
    fn all_markers_missing() {
        let mut acc = TrialAccumulator::new(AveragePolicy::FileCount);
        acc.push(Path::new("a"), Extraction::MarkerNotFound).unwrap();
        acc.push(Path::new("b"), Extraction::MarkerNotFound).unwrap();
        assert!(matches!(
            acc.finish(),
            Err(DgEvalError::NoTrialData { trials: 2 })
        ));
    }

    #[test]
    fn empty_first_vector_is_rejected() {
        let mut acc = TrialAccumulator::new(AveragePolicy::FileCount);
        assert!(matches!(
            acc.push(Path::new("a"), found(&[])),
            Err(DgEvalError::EmptyMetrics { .. })
        ));
    }

    #[test]
    fn policy_serde_names() {
        let json = serde_json::to_string(&AveragePolicy::ParsedCount).unwrap();
        assert_eq!(json, "\"parsed-count\"");
        let policy: AveragePolicy = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(policy, AveragePolicy::Strict);
        assert_eq!(AveragePolicy::FileCount.to_string(), "file-count");
    }
}
