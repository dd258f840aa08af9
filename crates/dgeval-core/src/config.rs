//! Aggregator configuration.
//!
//! Every field has a default matching the PACS training output, so an
//! absent or partial config file is fine. Files ending in `.json` are read
//! as JSON; anything else as TOML.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::AveragePolicy;
use crate::error::{DgEvalError, Result};
use crate::layout::ColumnLayout;
use crate::trial::{TrialLayout, DEFAULT_SEEDS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregatorConfig {
    pub seeds: Vec<u64>,
    pub policy: AveragePolicy,
    pub trial: TrialLayout,
    pub columns: ColumnLayout,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            seeds: DEFAULT_SEEDS.to_vec(),
            policy: AveragePolicy::default(),
            trial: TrialLayout::default(),
            columns: ColumnLayout::default(),
        }
    }
}

impl AggregatorConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => DgEvalError::InvalidConfig(format!(
                "config file not found: {}",
                path.display()
            )),
            _ => DgEvalError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        };
        let config = parsed.map_err(|err| match err {
            DgEvalError::InvalidConfig(msg) => {
                DgEvalError::InvalidConfig(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        tracing::debug!(config = %path.display(), seeds = ?config.seeds, "config loaded");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| DgEvalError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)
            .map_err(|e| DgEvalError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.seeds.is_empty() {
            return Err(DgEvalError::InvalidConfig(
                "at least one seed is required".to_string(),
            ));
        }
        self.trial.validate()?;
        self.columns.validate()?;
        Ok(())
    }

    /// Trial log paths under `base_path`, one per configured seed.
    pub fn trial_logs(&self, base_path: &Path) -> Vec<PathBuf> {
        self.trial.locate(base_path, &self.seeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DomainColumn;

    #[test]
    fn empty_toml_is_default() {
        let config = AggregatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, AggregatorConfig::default());
    }

    #[test]
    fn full_toml() {
        let config = AggregatorConfig::from_toml_str(
            r#"
seeds = [3, 4]
policy = "strict"

[trial]
dir_template = "run_{seed}"
log_file = "log.txt"

[columns]
iid = { name = "Caltech", index = 0 }
ood = [
  { name = "LabelMe", index = 1 },
  { name = "SUN", index = 2 },
]
"#,
        )
        .unwrap();
        assert_eq!(config.seeds, vec![3, 4]);
        assert_eq!(config.policy, AveragePolicy::Strict);
        assert_eq!(config.trial.log_file, "log.txt");
        assert_eq!(config.columns.iid, DomainColumn::new("Caltech", 0));
        assert_eq!(config.columns.ood.len(), 2);
        assert_eq!(
            config.trial_logs(Path::new("/res")),
            vec![
                PathBuf::from("/res/run_3/log.txt"),
                PathBuf::from("/res/run_4/log.txt"),
            ]
        );
    }

    #[test]
    fn partial_trial_section_keeps_defaults() {
        let config = AggregatorConfig::from_toml_str("[trial]\nlog_file = \"train.log\"\n").unwrap();
        assert_eq!(config.trial.dir_template, "t123_s{seed}");
        assert_eq!(config.trial.log_file, "train.log");
    }

    #[test]
    fn json_config() {
        let config =
            AggregatorConfig::from_json_str(r#"{"seeds": [9], "policy": "parsed-count"}"#).unwrap();
        assert_eq!(config.seeds, vec![9]);
        assert_eq!(config.policy, AveragePolicy::ParsedCount);
        assert_eq!(config.columns, ColumnLayout::default());
    }

    #[test]
    fn rejects_empty_seeds() {
        let err = AggregatorConfig::from_toml_str("seeds = []").unwrap_err();
        assert!(err.to_string().contains("seed"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            AggregatorConfig::from_toml_str("seed = [1]"),
            Err(DgEvalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_unknown_keys_in_sections() {
        let err = AggregatorConfig::from_toml_str("[trial]\ndir_templat = \"run_{seed}\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("dir_templat"));

        let err = AggregatorConfig::from_toml_str(
            "[columns]\niid = { name = \"A\", index = 0 }\nodd = []\n",
        )
        .unwrap_err();
        assert!(matches!(err, DgEvalError::InvalidConfig(_)));

        let err = AggregatorConfig::from_toml_str(
            "[columns]\niid = { name = \"A\", idx = 0 }\nood = [{ name = \"B\", index = 1 }]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("idx"));
    }

    #[test]
    fn rejects_invalid_layout() {
        let err = AggregatorConfig::from_toml_str(
            "[columns]\niid = { name = \"A\", index = 0 }\nood = []\n",
        )
        .unwrap_err();
        assert!(matches!(err, DgEvalError::InvalidLayout(_)));
    }

    #[test]
    fn load_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dgeval.toml");
        fs::write(&path, "policy = 3").unwrap();
        let err = AggregatorConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("dgeval.toml"));
    }

    #[test]
    fn load_missing_file() {
        let err = AggregatorConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, DgEvalError::InvalidConfig(_)));
    }
}
