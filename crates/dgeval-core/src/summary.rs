//! Percentage summary of an averaged metric vector.

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateResult;
use crate::error::{DgEvalError, Result};
use crate::layout::{ColumnLayout, DomainColumn};

/// Round to two decimal places.
///
/// Rounds the exact binary value once, ties to even, so `28.125` gives
/// `28.12` and `2.675` (stored just below the tie) gives `2.67`.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Score of one domain, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub name: String,
    pub index: usize,
    pub score: f64,
}

/// IID score, OOD scores and the gap between them, all in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Every column scaled to percent and rounded to two decimals.
    pub scaled: Vec<f64>,
    pub iid: DomainScore,
    pub ood: Vec<DomainScore>,
    /// Mean of the rounded OOD scores, rounded again.
    pub ood_mean: f64,
    /// `iid - ood_mean`, rounded.
    pub domain_gap: f64,
}

/// Summarize an aggregate with the given column layout.
pub fn summarize(aggregate: &AggregateResult, layout: &ColumnLayout) -> Result<Summary> {
    summarize_values(aggregate.values.values(), layout)
}

/// Summarize a raw fraction vector (values in 0..=1).
pub fn summarize_values(values: &[f64], layout: &ColumnLayout) -> Result<Summary> {
    layout.validate()?;
    let scaled: Vec<f64> = values.iter().map(|v| round2(v * 100.0)).collect();

    let score = |column: &DomainColumn| -> Result<DomainScore> {
        let value = scaled
            .get(column.index)
            .copied()
            .ok_or_else(|| DgEvalError::ColumnOutOfRange {
                domain: column.name.clone(),
                index: column.index,
                width: scaled.len(),
            })?;
        Ok(DomainScore {
            name: column.name.clone(),
            index: column.index,
            score: value,
        })
    };

    let iid = score(&layout.iid)?;
    let ood = layout.ood.iter().map(score).collect::<Result<Vec<_>>>()?;

    let ood_mean = round2(ood.iter().map(|d| d.score).sum::<f64>() / ood.len() as f64);
    let domain_gap = round2(iid.score - ood_mean);

    Ok(Summary {
        scaled,
        iid,
        ood,
        ood_mean,
        domain_gap,
    })
}

/// Whole numbers keep one decimal (`90.0`); anything else prints its
/// shortest round-trip form (`70.33`).
pub fn format_score(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

impl Summary {
    /// Plain-text report, one labelled line per figure.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "IID ({}) Performance: {}\n",
            self.iid.name,
            format_score(self.iid.score)
        ));
        out.push_str(&format!(
            "Overall OOD Performance: {}\n",
            format_score(self.ood_mean)
        ));
        out.push_str(&format!("Domain Gap: {}\n", format_score(self.domain_gap)));
        for domain in &self.ood {
            out.push_str(&format!(
                "OOD ({}) Performance: {}\n",
                domain.name,
                format_score(domain.score)
            ));
        }
        out
    }
}
