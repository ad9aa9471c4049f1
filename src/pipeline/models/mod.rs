//! Classifiers used by model-based and wrapper selection
//!
//! Two estimators are provided: an L1-regularized logistic regression whose
//! coefficients drive sparsity-based selection, and a random forest whose
//! impurity importances drive tree-based selection. Wrapper methods (RFE,
//! sequential selection) accept either through [`EstimatorKind`].

mod logistic;
mod tree;

use serde::Serialize;

use super::error::{Result, SelectionError};
use super::matrix::{FeatureMatrix, LabelVector};

pub use logistic::{L1LogisticRegression, LogisticConfig};
pub use tree::{DecisionTree, ForestConfig, RandomForest};

/// A fitted-on-demand classifier over a [`FeatureMatrix`]
pub trait Classifier: Send + Sync {
    /// Fit on every row of `x`. Labels must be aligned with `x`.
    fn fit(&mut self, x: &FeatureMatrix, y: &LabelVector) -> Result<()>;

    /// Predicted class code for each row of `x`. The columns of `x` must be
    /// the features the model was fitted on, in the same order.
    fn predict(&self, x: &FeatureMatrix) -> Vec<usize>;

    /// Non-negative importance per fitted feature, in column order.
    fn feature_importances(&self) -> Vec<f64>;
}

/// Which estimator a wrapper method fits at each step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EstimatorKind {
    Logistic(LogisticConfig),
    RandomForest(ForestConfig),
}

impl Default for EstimatorKind {
    fn default() -> Self {
        EstimatorKind::Logistic(LogisticConfig::default())
    }
}

impl EstimatorKind {
    pub fn build(&self) -> Box<dyn Classifier> {
        match self {
            EstimatorKind::Logistic(config) => Box::new(L1LogisticRegression::new(config.clone())),
            EstimatorKind::RandomForest(config) => Box::new(RandomForest::new(config.clone())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EstimatorKind::Logistic(_) => "logistic",
            EstimatorKind::RandomForest(_) => "random-forest",
        }
    }

    /// Fit a fresh estimator on `x` and return its importances.
    pub fn fit_importances(&self, x: &FeatureMatrix, y: &LabelVector) -> Result<Vec<f64>> {
        let mut model = self.build();
        model.fit(x, y)?;
        Ok(model.feature_importances())
    }
}

/// Shared precondition for every estimator: aligned labels, at least one
/// feature and at least two classes present among the training rows.
pub(crate) fn check_trainable(x: &FeatureMatrix, y: &LabelVector) -> Result<()> {
    y.ensure_aligned(x)?;
    if x.n_features() == 0 {
        return Err(SelectionError::invalid_input(
            "Cannot fit a model without features",
        ));
    }
    let present = y.class_counts().iter().filter(|&&c| c > 0).count();
    if present < 2 {
        return Err(SelectionError::convergence(format!(
            "Training data contains {} class(es); at least 2 are required",
            present
        )));
    }
    Ok(())
}
