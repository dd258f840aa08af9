//! Per-seed log path construction.
//!
//! Training runs write one log per seed under `<base>/<dir_template>/<log_file>`,
//! where `{seed}` in the directory template is replaced by the seed. Nothing
//! here touches the filesystem.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DgEvalError, Result};

/// Placeholder substituted with the seed in [`TrialLayout::dir_template`].
pub const SEED_PLACEHOLDER: &str = "{seed}";

/// Seeds used when none are configured.
pub const DEFAULT_SEEDS: [u64; 3] = [0, 1, 2];

/// Naming scheme for per-seed trial directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrialLayout {
    pub dir_template: String,
    pub log_file: String,
}

impl Default for TrialLayout {
    fn default() -> Self {
        Self {
            dir_template: "t123_s{seed}".to_string(),
            log_file: "out.txt".to_string(),
        }
    }
}

impl TrialLayout {
    /// Check that the template can distinguish seeds and the log name is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.dir_template.contains(SEED_PLACEHOLDER) {
            return Err(DgEvalError::InvalidConfig(format!(
                "trial dir_template {:?} has no {} placeholder",
                self.dir_template, SEED_PLACEHOLDER
            )));
        }
        if self.log_file.trim().is_empty() {
            return Err(DgEvalError::InvalidConfig(
                "trial log_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory name for one seed.
    pub fn trial_dir(&self, seed: u64) -> String {
        self.dir_template.replace(SEED_PLACEHOLDER, &seed.to_string())
    }

    /// One log path per seed, in seed order.
    pub fn locate(&self, base_path: &Path, seeds: &[u64]) -> Vec<PathBuf> {
        seeds
            .iter()
            .map(|seed| base_path.join(self.trial_dir(*seed)).join(&self.log_file))
            .collect()
    }
}

/// Locate trial logs using the default `t123_s<seed>/out.txt` scheme.
pub fn locate_trial_logs(base_path: &Path, seeds: &[u64]) -> Vec<PathBuf> {
    TrialLayout::default().locate(base_path, seeds)
}
