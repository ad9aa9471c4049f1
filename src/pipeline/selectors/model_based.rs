//! Model-based selection: keep features a fitted model relies on

use serde::Serialize;

use super::{SelectionStrategy, StageOutcome};
use crate::pipeline::error::Result;
use crate::pipeline::matrix::{FeatureMatrix, LabelVector};
use crate::pipeline::models::{EstimatorKind, ForestConfig, LogisticConfig};

/// Coefficients below this count as zero for L1 models
pub const L1_ZERO_TOLERANCE: f64 = 1e-5;

/// Model whose coefficients or importances drive the selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ModelKind {
    /// Sparse logistic regression; keeps features with |coef| above the floor
    L1 {
        config: LogisticConfig,
        floor: Option<f64>,
    },
    /// Random forest; keeps features with importance at or above the floor
    /// (default: the mean importance)
    Tree {
        config: ForestConfig,
        floor: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelBasedSelector {
    pub model: ModelKind,
}

impl SelectionStrategy for ModelBasedSelector {
    fn name(&self) -> &'static str {
        match self.model {
            ModelKind::L1 { .. } => "model-based-l1",
            ModelKind::Tree { .. } => "model-based-tree",
        }
    }

    fn fit(&self, matrix: &FeatureMatrix, labels: &LabelVector) -> Result<StageOutcome> {
        labels.ensure_aligned(matrix)?;

        let selected: Vec<usize> = match &self.model {
            ModelKind::L1 { config, floor } => {
                let importances = EstimatorKind::Logistic(config.clone()).fit_importances(matrix, labels)?;
                let floor = floor.unwrap_or(L1_ZERO_TOLERANCE);
                (0..importances.len())
                    .filter(|&i| importances[i] > floor)
                    .collect()
            }
            ModelKind::Tree { config, floor } => {
                let importances =
                    EstimatorKind::RandomForest(config.clone()).fit_importances(matrix, labels)?;
                let floor = floor.unwrap_or_else(|| {
                    importances.iter().sum::<f64>() / importances.len().max(1) as f64
                });
                (0..importances.len())
                    .filter(|&i| importances[i] >= floor)
                    .collect()
            }
        };

        log::debug!(
            "{}: kept {} of {} features",
            self.name(),
            selected.len(),
            matrix.n_features()
        );

        Ok(StageOutcome::one_shot(selected))
    }
}
