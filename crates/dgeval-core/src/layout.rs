//! Named column layout for metric vectors.
//!
//! A metric vector carries no header; which column belongs to which domain
//! is a convention of the training run. [`ColumnLayout`] makes that
//! convention explicit: one in-distribution column and one or more
//! out-of-distribution columns, each with a domain name.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{DgEvalError, Result};

/// A domain name bound to its column in the metric vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainColumn {
    pub name: String,
    pub index: usize,
}

impl DomainColumn {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// IID and OOD columns of one benchmark arrangement.
///
/// # Invariants
///
/// At least one OOD column, and no domain name appears twice. Both are
/// checked by [`ColumnLayout::new`] and [`ColumnLayout::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnLayout {
    pub iid: DomainColumn,
    pub ood: Vec<DomainColumn>,
}

impl Default for ColumnLayout {
    /// PACS with Photo as the training domain.
    fn default() -> Self {
        Self {
            iid: DomainColumn::new("Photo", 2),
            ood: vec![
                DomainColumn::new("Art", 4),
                DomainColumn::new("Cartoon", 6),
                DomainColumn::new("Sketch", 8),
            ],
        }
    }
}

impl ColumnLayout {
    pub fn new(iid: DomainColumn, ood: Vec<DomainColumn>) -> Result<Self> {
        let layout = Self { iid, ood };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ood.is_empty() {
            return Err(DgEvalError::InvalidLayout(
                "at least one OOD column is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for column in self.columns() {
            if column.name.trim().is_empty() {
                return Err(DgEvalError::InvalidLayout(format!(
                    "column {} has an empty domain name",
                    column.index
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(DgEvalError::InvalidLayout(format!(
                    "domain {:?} appears more than once",
                    column.name
                )));
            }
        }
        Ok(())
    }

    /// IID column first, then OOD columns in order.
    pub fn columns(&self) -> impl Iterator<Item = &DomainColumn> {
        std::iter::once(&self.iid).chain(self.ood.iter())
    }
}
