//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use crate::pipeline::{load_pipeline_config, PipelineConfig};

/// featsel - select a compact, non-redundant feature set for a labeled dataset
#[derive(Parser, Debug)]
#[command(name = "featsel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Label column name (class per sample)
    #[arg(short, long)]
    pub target: String,

    /// Sample identifier column, carried through to the output but never used as a feature
    #[arg(long)]
    pub id_column: Option<String>,

    /// Output file path (CSV or Parquet, determined by extension).
    /// Defaults to input directory with '_selected' suffix (e.g., data.csv -> data_selected.csv).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON pipeline configuration. Flags given on the command line override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Redundancy threshold - features whose absolute correlation reaches this value are collapsed
    /// to one representative [default: 0.9]
    #[arg(long, value_parser = validate_correlation_threshold)]
    pub correlation_threshold: Option<f64>,

    /// Minimum variance - drop features whose variance is below this value [default: 1e-8]
    #[arg(long, value_parser = validate_non_negative)]
    pub min_variance: Option<f64>,

    /// Skip redundancy pruning
    #[arg(long, default_value = "false")]
    pub no_redundancy: bool,

    /// Skip low-variance filtering
    #[arg(long, default_value = "false")]
    pub no_variance: bool,

    /// Selection methods to run in order (comma-separated).
    /// Options: univariate, model-based-l1, model-based-tree, recursive-elimination-cv (rfecv),
    /// sequential-forward, sequential-backward [default: univariate]
    #[arg(short, long, value_delimiter = ',')]
    pub methods: Vec<String>,

    /// Univariate scoring function: chi-square, f-classif or mutual-information [default: f-classif]
    #[arg(long)]
    pub scoring: Option<String>,

    /// Number of cross-validation folds for wrapper methods [default: 5]
    #[arg(long)]
    pub folds: Option<usize>,

    /// Use plain shuffled folds instead of stratified folds
    #[arg(long, default_value = "false")]
    pub no_stratified: bool,

    /// Univariate: number of top-scoring features to keep [default: 10]
    #[arg(short, long, conflicts_with = "percentile")]
    pub k: Option<usize>,

    /// Univariate: percentage of top-scoring features to keep (0-100]
    #[arg(long, value_parser = validate_percentile)]
    pub percentile: Option<f64>,

    /// Base estimator for recursive elimination and sequential selection:
    /// logistic or random-forest [default: logistic]
    #[arg(long)]
    pub estimator: Option<String>,

    /// L1 penalty strength for the logistic model [default: 0.01]
    #[arg(long, value_parser = validate_non_negative)]
    pub l1_alpha: Option<f64>,

    /// Number of trees in the random forest [default: 50]
    #[arg(long)]
    pub n_estimators: Option<usize>,

    /// Seed for fold shuffling and forest bootstraps [default: 0]
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum evaluation rounds for iterative methods [default: 1000]
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Wall-clock limit in seconds for each iterative method
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Accept an empty selection instead of failing
    #[arg(long, default_value = "false")]
    pub allow_empty: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let parent = self.input.parent().unwrap_or_else(|| Path::new("."));
        let stem = self
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        parent.join(format!("{}{}", stem, suffix))
    }

    /// Get the output path, deriving from input if not explicitly provided.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let extension = self
                .input
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("parquet");
            self.sibling_path(&format!("_selected.{}", extension))
        })
    }

    /// Path of the one-name-per-line feature list.
    pub fn features_path(&self) -> PathBuf {
        self.sibling_path("_features.txt")
    }

    /// Path of the JSON export of the selection result.
    pub fn selection_json_path(&self) -> PathBuf {
        self.sibling_path("_selection.json")
    }

    /// Resolve the pipeline configuration: the `--config` file (or defaults)
    /// with every flag given on the command line applied on top.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let base = match &self.config {
            Some(path) => load_pipeline_config(path)?,
            None => PipelineConfig::default(),
        };
        Ok(self.apply_overrides(base))
    }

    /// Apply explicit flags over `config`.
    pub fn apply_overrides(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(t) = self.correlation_threshold {
            config.redundancy_threshold = Some(t);
        }
        if self.no_redundancy {
            config.redundancy_threshold = None;
        }
        if let Some(v) = self.min_variance {
            config.min_variance = Some(v);
        }
        if self.no_variance {
            config.min_variance = None;
        }

        let selection = &mut config.selection;
        if !self.methods.is_empty() {
            selection.methods = self.methods.clone();
        }
        if let Some(scoring) = &self.scoring {
            selection.scoring_function = scoring.clone();
        }
        if let Some(folds) = self.folds {
            selection.cross_validation_folds = folds;
        }
        if self.no_stratified {
            selection.stratified = false;
        }
        if let Some(k) = self.k {
            selection.k = Some(k);
            selection.percentile = None;
        }
        if let Some(p) = self.percentile {
            selection.percentile = Some(p);
            selection.k = None;
        }
        if let Some(estimator) = &self.estimator {
            selection.estimator = estimator.clone();
        }
        if let Some(alpha) = self.l1_alpha {
            selection.l1_alpha = alpha;
        }
        if let Some(n) = self.n_estimators {
            selection.n_estimators = n;
        }
        if let Some(seed) = self.seed {
            selection.seed = seed;
        }
        if let Some(max) = self.max_iterations {
            selection.max_iterations = max;
        }
        if let Some(secs) = self.timeout_secs {
            selection.timeout_secs = Some(secs);
        }
        if self.allow_empty {
            selection.allow_empty = true;
        }

        config
    }
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.parse()
        .map_err(|_| format!("'{}' is not a valid number", s))
}

/// Validator for correlation_threshold parameter
fn validate_correlation_threshold(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "correlation_threshold must be in (0.0, 1.0], got {}",
            value
        ))
    }
}

/// Validator for percentile parameter
fn validate_percentile(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value > 0.0 && value <= 100.0 {
        Ok(value)
    } else {
        Err(format!("percentile must be in (0, 100], got {}", value))
    }
}

/// Validator for non-negative parameters
fn validate_non_negative(s: &str) -> Result<f64, String> {
    let value = parse_number(s)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("value must be non-negative, got {}", value))
    }
}
