//! dgeval - trial-seed result aggregation CLI
//!
//! Reads `<filename>/t123_s<seed>/out.txt` for each seed, averages the last
//! best-model metrics and prints IID score, OOD average and domain gap.
//!
//! The report goes to stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dgeval_core::{
    average_with_policy, summarize, AggregateResult, AggregatorConfig, AveragePolicy, Summary,
    METRICS,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

const DEFAULT_BASE_DIR: &str = "./Results/PACS_Custom/ME_ADA_CNN/Resnet18";

#[derive(Parser)]
#[command(name = "dgeval")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Average domain-generalization results across trial seeds", long_about = None)]
struct Cli {
    /// Base directory holding one sub-directory per trial seed
    #[arg(long, default_value = DEFAULT_BASE_DIR)]
    filename: PathBuf,

    /// Trial seeds, comma separated (default: 0,1,2 or the config value)
    #[arg(long, value_delimiter = ',')]
    seeds: Option<Vec<u64>>,

    /// TOML or JSON config with seeds, policy, trial layout and columns
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How trials without a best-model checkpoint affect the average
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Report format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    FileCount,
    ParsedCount,
    Strict,
}

impl From<PolicyArg> for AveragePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::FileCount => AveragePolicy::FileCount,
            PolicyArg::ParsedCount => AveragePolicy::ParsedCount,
            PolicyArg::Strict => AveragePolicy::Strict,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    dgeval_core::init_tracing(cli.json_logs, level);

    let config = resolve_config(&cli)?;
    let result = run(&cli.filename, &config);
    METRICS.flush();
    let (aggregate, summary) = result?;

    match cli.format {
        OutputFormat::Text => print!("{}", summary.render_text()),
        OutputFormat::Json => print_json(&cli.filename, &aggregate, &summary)?,
    }
    Ok(())
}

/// Config file values, overridden by explicit flags.
fn resolve_config(cli: &Cli) -> Result<AggregatorConfig> {
    let mut config = match &cli.config {
        Some(path) => AggregatorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AggregatorConfig::default(),
    };
    if let Some(seeds) = &cli.seeds {
        config.seeds = seeds.clone();
    }
    if let Some(policy) = cli.policy {
        config.policy = policy.into();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run(base: &Path, config: &AggregatorConfig) -> Result<(AggregateResult, Summary)> {
    let paths = config.trial_logs(base);
    info!(
        base = %base.display(),
        trials = paths.len(),
        policy = %config.policy,
        "averaging trial logs"
    );

    let aggregate = average_with_policy(&paths, config.policy)
        .with_context(|| format!("Failed to aggregate trials under {}", base.display()))?;
    let summary =
        summarize(&aggregate, &config.columns).context("Failed to summarize averaged metrics")?;
    Ok((aggregate, summary))
}

fn print_json(base: &Path, aggregate: &AggregateResult, summary: &Summary) -> Result<()> {
    let missing: Vec<String> = aggregate
        .missing
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    let report = json!({
        "base": base.display().to_string(),
        "trials": aggregate.trials,
        "parsed": aggregate.parsed,
        "missing": missing,
        "policy": aggregate.policy,
        "mean": aggregate.values,
        "summary": summary,
    });
    let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{out}");
    Ok(())
}
