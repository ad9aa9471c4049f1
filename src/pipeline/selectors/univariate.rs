//! Univariate selection: keep the best-scoring features by an independent
//! statistical test

use serde::Serialize;

use super::{SelectionStrategy, StageOutcome};
use crate::pipeline::error::Result;
use crate::pipeline::matrix::{FeatureMatrix, LabelVector};
use crate::pipeline::scoring::ScoringFunction;

/// How many top-scoring features to keep
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum UnivariateMode {
    /// Keep the `k` best (all of them if `k` exceeds the feature count)
    TopK(usize),
    /// Keep the best `p` percent, rounded up
    Percentile(f64),
}

impl UnivariateMode {
    fn keep_count(&self, n_features: usize) -> usize {
        match *self {
            UnivariateMode::TopK(k) => k.min(n_features),
            UnivariateMode::Percentile(p) => {
                ((n_features as f64 * p / 100.0).ceil() as usize).min(n_features)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnivariateSelector {
    pub scoring: ScoringFunction,
    pub mode: UnivariateMode,
}

impl SelectionStrategy for UnivariateSelector {
    fn name(&self) -> &'static str {
        "univariate"
    }

    fn fit(&self, matrix: &FeatureMatrix, labels: &LabelVector) -> Result<StageOutcome> {
        let scores = self.scoring.score(matrix, labels)?;

        let mut order: Vec<usize> = (0..scores.len()).collect();
        // NaN scores rank last; equal scores keep column order
        order.sort_by(|&a, &b| {
            let sa = if scores[a].is_nan() { f64::NEG_INFINITY } else { scores[a] };
            let sb = if scores[b].is_nan() { f64::NEG_INFINITY } else { scores[b] };
            sb.total_cmp(&sa).then_with(|| a.cmp(&b))
        });
        order.truncate(self.mode.keep_count(scores.len()));

        log::debug!(
            "univariate ({}): kept {} of {} features",
            self.scoring,
            order.len(),
            scores.len()
        );

        Ok(StageOutcome::one_shot(order))
    }
}
