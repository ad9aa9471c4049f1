//! Selection configuration
//!
//! Configuration arrives as plain names and numbers (from the CLI or a JSON
//! file) and is resolved into typed strategies before any data is touched.
//! All validation errors surface as [`SelectionError::InvalidConfig`].

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result as AnyResult};
use serde::{Deserialize, Serialize};

use super::budget::IterationBudget;
use super::cv::CvMetric;
use super::error::{Result, SelectionError};
use super::models::{EstimatorKind, ForestConfig, LogisticConfig};
use super::redundancy::DEFAULT_REDUNDANCY_THRESHOLD;
use super::scoring::ScoringFunction;
use super::selectors::{
    CvSettings, Direction, ModelBasedSelector, ModelKind, RecursiveEliminationCv,
    SelectionStrategy, SequentialSelector, UnivariateMode, UnivariateSelector,
};
use super::variance::DEFAULT_MIN_VARIANCE;

/// Default number of features kept by univariate selection
pub const DEFAULT_TOP_K: usize = 10;

/// Selection methods the cascade can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    Univariate,
    ModelBasedL1,
    ModelBasedTree,
    RecursiveEliminationCv,
    SequentialForward,
    SequentialBackward,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Univariate => "univariate",
            Method::ModelBasedL1 => "model-based-l1",
            Method::ModelBasedTree => "model-based-tree",
            Method::RecursiveEliminationCv => "recursive-elimination-cv",
            Method::SequentialForward => "sequential-forward",
            Method::SequentialBackward => "sequential-backward",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Method {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "univariate" => Ok(Method::Univariate),
            "model-based-l1" | "l1" => Ok(Method::ModelBasedL1),
            "model-based-tree" | "tree" => Ok(Method::ModelBasedTree),
            "recursive-elimination-cv" | "rfecv" => Ok(Method::RecursiveEliminationCv),
            "sequential-forward" => Ok(Method::SequentialForward),
            "sequential-backward" => Ok(Method::SequentialBackward),
            _ => Err(SelectionError::invalid_config(format!(
                "Unknown selection method: '{}'. Use univariate, model-based-l1, model-based-tree, \
                 recursive-elimination-cv, sequential-forward or sequential-backward.",
                s
            ))),
        }
    }
}

/// Base estimator for wrapper methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EstimatorName {
    Logistic,
    RandomForest,
}

impl std::str::FromStr for EstimatorName {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "logistic" | "l1-logistic" => Ok(EstimatorName::Logistic),
            "random-forest" | "forest" => Ok(EstimatorName::RandomForest),
            _ => Err(SelectionError::invalid_config(format!(
                "Unknown estimator: '{}'. Use 'logistic' or 'random-forest'.",
                s
            ))),
        }
    }
}

/// Options for the selection cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Methods to run in order; each narrows the previous stage's features
    pub methods: Vec<String>,
    pub scoring_function: String,
    pub cross_validation_folds: usize,
    pub stratified: bool,
    /// Univariate: keep the top `k` (mutually exclusive with `percentile`)
    pub k: Option<usize>,
    /// Univariate: keep the top percentile, in (0, 100]
    pub percentile: Option<f64>,
    /// Base model for recursive elimination and sequential selection
    pub estimator: String,
    pub l1_alpha: f64,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    /// Model-based: coefficient / importance floor
    pub importance_floor: Option<f64>,
    pub min_features_to_select: usize,
    pub step: usize,
    pub patience: Option<usize>,
    pub n_features_to_select: Option<usize>,
    pub tolerance: f64,
    pub cv_metric: String,
    pub max_iterations: usize,
    pub timeout_secs: Option<u64>,
    pub seed: u64,
    /// Permit an empty selection instead of failing
    pub allow_empty: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            methods: vec!["univariate".to_string()],
            scoring_function: "f-classif".to_string(),
            cross_validation_folds: 5,
            stratified: true,
            k: None,
            percentile: None,
            estimator: "logistic".to_string(),
            l1_alpha: LogisticConfig::default().alpha,
            n_estimators: ForestConfig::default().n_estimators,
            max_depth: None,
            importance_floor: None,
            min_features_to_select: 1,
            step: 1,
            patience: None,
            n_features_to_select: None,
            tolerance: 1e-4,
            cv_metric: "accuracy".to_string(),
            max_iterations: IterationBudget::default().max_iterations,
            timeout_secs: None,
            seed: 0,
            allow_empty: false,
        }
    }
}

impl SelectionConfig {
    /// Convenience constructor for a single method with default options.
    pub fn with_method(method: &str) -> Self {
        Self {
            methods: vec![method.to_string()],
            ..Default::default()
        }
    }

    /// Check every option and build the strategies in execution order.
    pub fn resolve(&self) -> Result<Vec<Box<dyn SelectionStrategy>>> {
        if self.methods.is_empty() {
            return Err(SelectionError::invalid_config(
                "At least one selection method is required",
            ));
        }

        let methods = self
            .methods
            .iter()
            .map(|m| m.parse::<Method>())
            .collect::<Result<Vec<Method>>>()?;

        let scoring: ScoringFunction = self.scoring_function.parse()?;
        let metric: CvMetric = self.cv_metric.parse()?;
        let estimator_name: EstimatorName = self.estimator.parse()?;

        let mode = self.univariate_mode()?;
        self.validate_numbers()?;

        let logistic = LogisticConfig {
            alpha: self.l1_alpha,
            ..Default::default()
        };
        let forest = ForestConfig {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            seed: self.seed,
            ..Default::default()
        };
        let estimator = match estimator_name {
            EstimatorName::Logistic => EstimatorKind::Logistic(logistic.clone()),
            EstimatorName::RandomForest => EstimatorKind::RandomForest(forest.clone()),
        };
        let cv = CvSettings {
            folds: self.cross_validation_folds,
            stratified: self.stratified,
            metric,
            seed: self.seed,
        };
        let budget = IterationBudget {
            max_iterations: self.max_iterations,
            timeout: self.timeout_secs.map(Duration::from_secs),
        };

        let strategies = methods
            .into_iter()
            .map(|method| -> Box<dyn SelectionStrategy> {
                match method {
                    Method::Univariate => Box::new(UnivariateSelector { scoring, mode }),
                    Method::ModelBasedL1 => Box::new(ModelBasedSelector {
                        model: ModelKind::L1 {
                            config: logistic.clone(),
                            floor: self.importance_floor,
                        },
                    }),
                    Method::ModelBasedTree => Box::new(ModelBasedSelector {
                        model: ModelKind::Tree {
                            config: forest.clone(),
                            floor: self.importance_floor,
                        },
                    }),
                    Method::RecursiveEliminationCv => Box::new(RecursiveEliminationCv {
                        estimator: estimator.clone(),
                        cv,
                        min_features_to_select: self.min_features_to_select,
                        step: self.step,
                        patience: self.patience,
                        tolerance: self.tolerance,
                        budget,
                    }),
                    Method::SequentialForward | Method::SequentialBackward => {
                        Box::new(SequentialSelector {
                            direction: if method == Method::SequentialForward {
                                Direction::Forward
                            } else {
                                Direction::Backward
                            },
                            estimator: estimator.clone(),
                            cv,
                            n_features_to_select: self.n_features_to_select,
                            tolerance: self.tolerance,
                            budget,
                        })
                    }
                }
            })
            .collect();

        Ok(strategies)
    }

    fn univariate_mode(&self) -> Result<UnivariateMode> {
        match (self.k, self.percentile) {
            (Some(_), Some(_)) => Err(SelectionError::invalid_config(
                "Set either k or percentile for univariate selection, not both",
            )),
            (Some(0), None) => Err(SelectionError::invalid_config("k must be at least 1")),
            (Some(k), None) => Ok(UnivariateMode::TopK(k)),
            (None, Some(p)) if !(p > 0.0 && p <= 100.0) => Err(SelectionError::invalid_config(
                format!("percentile must be in (0, 100], got {}", p),
            )),
            (None, Some(p)) => Ok(UnivariateMode::Percentile(p)),
            (None, None) => Ok(UnivariateMode::TopK(DEFAULT_TOP_K)),
        }
    }

    fn validate_numbers(&self) -> Result<()> {
        let checks: [(bool, String); 10] = [
            (
                self.cross_validation_folds < 2,
                format!(
                    "cross_validation_folds must be at least 2, got {}",
                    self.cross_validation_folds
                ),
            ),
            (self.step == 0, "step must be at least 1".to_string()),
            (
                self.min_features_to_select == 0,
                "min_features_to_select must be at least 1".to_string(),
            ),
            (
                self.n_features_to_select == Some(0),
                "n_features_to_select must be at least 1".to_string(),
            ),
            (
                !(self.l1_alpha >= 0.0),
                format!("l1_alpha must be non-negative, got {}", self.l1_alpha),
            ),
            (self.n_estimators == 0, "n_estimators must be at least 1".to_string()),
            (
                !(self.tolerance >= 0.0),
                format!("tolerance must be non-negative, got {}", self.tolerance),
            ),
            (self.max_iterations == 0, "max_iterations must be at least 1".to_string()),
            (
                self.timeout_secs == Some(0),
                "timeout_secs must be at least 1".to_string(),
            ),
            (
                self.importance_floor.map(|f| f.is_nan() || f < 0.0).unwrap_or(false),
                "importance_floor must be non-negative".to_string(),
            ),
        ];

        match checks.into_iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(SelectionError::invalid_config(message)),
            None => Ok(()),
        }
    }
}

/// Options for the whole run: redundancy pruning, variance filtering and the
/// selection cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// `None` skips redundancy pruning
    pub redundancy_threshold: Option<f64>,
    /// `None` skips variance filtering
    pub min_variance: Option<f64>,
    pub selection: SelectionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            redundancy_threshold: Some(DEFAULT_REDUNDANCY_THRESHOLD),
            min_variance: Some(DEFAULT_MIN_VARIANCE),
            selection: SelectionConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate the pre-filter thresholds. The cascade is validated by
    /// [`SelectionConfig::resolve`].
    pub fn validate_filters(&self) -> Result<()> {
        if let Some(t) = self.redundancy_threshold {
            if t.is_nan() || t <= 0.0 {
                return Err(SelectionError::invalid_config(format!(
                    "Redundancy threshold must be in (0, 1], got {}",
                    t
                )));
            }
        }
        if let Some(v) = self.min_variance {
            if v.is_nan() || v < 0.0 {
                return Err(SelectionError::invalid_config(format!(
                    "Minimum variance must be a non-negative number, got {}",
                    v
                )));
            }
        }
        Ok(())
    }
}

/// Load a pipeline configuration from a JSON file. Missing keys take their
/// defaults.
pub fn load_pipeline_config(path: &Path) -> AnyResult<PipelineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
