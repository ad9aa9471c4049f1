//! Selection strategies
//!
//! Every method of the cascade implements [`SelectionStrategy`], so the
//! cascade composes them without knowing which kind it is running.

mod model_based;
mod rfe;
mod sequential;
mod univariate;

use serde::Serialize;

use super::cv::{build_folds, CvMetric, Fold};
use super::error::Result;
use super::matrix::{FeatureMatrix, LabelVector};
use super::result::{SelectionLog, SelectionResult, StageDetails};

pub use model_based::{ModelBasedSelector, ModelKind};
pub use rfe::RecursiveEliminationCv;
pub use sequential::{Direction, SequentialSelector};
pub use univariate::{UnivariateMode, UnivariateSelector};

/// What a single strategy kept
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    /// Kept column positions of the input matrix, ascending
    pub selected: Vec<usize>,
    pub best_cv_score: Option<f64>,
    pub iterations: usize,
    pub budget_exhausted: bool,
}

impl StageOutcome {
    /// Outcome of a one-shot (non-iterative) method.
    pub fn one_shot(mut selected: Vec<usize>) -> Self {
        selected.sort_unstable();
        Self {
            selected,
            best_cv_score: None,
            iterations: 0,
            budget_exhausted: false,
        }
    }

    pub(crate) fn details(&self) -> StageDetails {
        StageDetails {
            best_cv_score: self.best_cv_score,
            iterations: self.iterations,
            budget_exhausted: self.budget_exhausted,
        }
    }
}

/// A feature selection method with its configuration resolved
pub trait SelectionStrategy: Send + Sync + std::fmt::Debug {
    /// Stage name recorded in results (the method name).
    fn name(&self) -> &'static str;

    /// Choose a subset of the columns of `matrix`.
    fn fit(&self, matrix: &FeatureMatrix, labels: &LabelVector) -> Result<StageOutcome>;

    /// Run this strategy alone and package the outcome as a result.
    fn select(&self, matrix: &FeatureMatrix, labels: &LabelVector) -> Result<SelectionResult> {
        labels.ensure_aligned(matrix)?;
        let outcome = self.fit(matrix, labels)?;
        let kept: Vec<String> = outcome
            .selected
            .iter()
            .map(|&i| matrix.feature_names()[i].clone())
            .collect();

        let mut log = SelectionLog::new(matrix);
        log.record(self.name(), &kept, outcome.details());
        Ok(log.finish())
    }
}

/// How wrapper methods cross-validate candidate subsets
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CvSettings {
    pub folds: usize,
    pub stratified: bool,
    pub metric: CvMetric,
    pub seed: u64,
}

impl Default for CvSettings {
    fn default() -> Self {
        Self {
            folds: 5,
            stratified: true,
            metric: CvMetric::Accuracy,
            seed: 0,
        }
    }
}

impl CvSettings {
    pub fn folds_for(&self, labels: &LabelVector) -> Result<Vec<Fold>> {
        build_folds(labels, self.folds, self.stratified, self.seed)
    }
}

/// Indices of the `count` smallest values; ties drop the later column first
/// so earlier columns win when importances are equal.
pub(crate) fn weakest_positions(importances: &[f64], count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..importances.len()).collect();
    order.sort_by(|&a, &b| {
        importances[a]
            .total_cmp(&importances[b])
            .then_with(|| b.cmp(&a))
    });
    order.truncate(count);
    order
}
