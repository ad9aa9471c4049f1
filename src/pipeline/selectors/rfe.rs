//! Recursive feature elimination with cross-validation
//!
//! The search is an explicit state machine:
//!
//! ```text
//! Initial ──► Evaluating(subset) ──► Pruning(subset) ──► Evaluating(smaller) ...
//!                    │
//!                    └──► Terminal(best subset)
//! ```
//!
//! Each evaluation costs one unit of the iteration budget, so the search
//! always terminates.

use super::{weakest_positions, CvSettings, SelectionStrategy, StageOutcome};
use crate::pipeline::budget::{BudgetTracker, IterationBudget};
use crate::pipeline::cv::{cross_val_score, Fold};
use crate::pipeline::error::{Result, SelectionError};
use crate::pipeline::matrix::{FeatureMatrix, LabelVector};
use crate::pipeline::models::EstimatorKind;

#[derive(Debug, Clone, PartialEq)]
pub struct RecursiveEliminationCv {
    pub estimator: EstimatorKind,
    pub cv: CvSettings,
    /// Never prune below this many features
    pub min_features_to_select: usize,
    /// Features removed per pruning round
    pub step: usize,
    /// Stop after this many rounds without improving the best score
    pub patience: Option<usize>,
    /// Score gain that counts as an improvement
    pub tolerance: f64,
    pub budget: IterationBudget,
}

/// Search states; subsets hold column positions of the input matrix
#[derive(Debug, Clone, PartialEq)]
enum RfeState {
    Initial,
    Evaluating { subset: Vec<usize> },
    Pruning { subset: Vec<usize> },
    Terminal,
}

/// Mutable bookkeeping carried across transitions
struct RfeSearch<'a> {
    config: &'a RecursiveEliminationCv,
    matrix: &'a FeatureMatrix,
    labels: &'a LabelVector,
    folds: Vec<Fold>,
    tracker: BudgetTracker,
    best: Option<(Vec<usize>, f64)>,
    stale_rounds: usize,
    budget_exhausted: bool,
}

impl<'a> RfeSearch<'a> {
    fn step(&mut self, state: RfeState) -> Result<RfeState> {
        match state {
            RfeState::Initial => Ok(RfeState::Evaluating {
                subset: (0..self.matrix.n_features()).collect(),
            }),

            RfeState::Evaluating { subset } => {
                if !self.tracker.try_consume() {
                    self.budget_exhausted = true;
                    return Ok(RfeState::Terminal);
                }

                let score = cross_val_score(
                    &self.config.estimator,
                    self.matrix,
                    self.labels,
                    &subset,
                    &self.folds,
                    self.config.cv.metric,
                )?;
                log::debug!(
                    "rfecv round {}: {} features, cv score {:.4}",
                    self.tracker.used(),
                    subset.len(),
                    score
                );

                self.track_best(&subset, score);

                let floor_reached = subset.len() <= self.config.min_features_to_select;
                let out_of_patience = self
                    .config
                    .patience
                    .map(|p| self.stale_rounds >= p)
                    .unwrap_or(false);

                if floor_reached || out_of_patience {
                    Ok(RfeState::Terminal)
                } else {
                    Ok(RfeState::Pruning { subset })
                }
            }

            RfeState::Pruning { subset } => {
                let current = self.matrix.select_columns(&subset);
                let importances = self.config.estimator.fit_importances(&current, self.labels)?;

                let removable = subset.len() - self.config.min_features_to_select;
                let drop = weakest_positions(&importances, self.config.step.min(removable));

                let next: Vec<usize> = subset
                    .iter()
                    .enumerate()
                    .filter(|(pos, _)| !drop.contains(pos))
                    .map(|(_, &col)| col)
                    .collect();

                Ok(RfeState::Evaluating { subset: next })
            }

            RfeState::Terminal => Ok(RfeState::Terminal),
        }
    }

    /// Subsets shrink as the search proceeds, so replacing the best on a tie
    /// prefers the smaller subset.
    fn track_best(&mut self, subset: &[usize], score: f64) {
        match &self.best {
            None => {
                self.best = Some((subset.to_vec(), score));
            }
            Some((_, best_score)) => {
                let best_score = *best_score;
                if score > best_score + self.config.tolerance {
                    self.stale_rounds = 0;
                } else {
                    self.stale_rounds += 1;
                }
                if score >= best_score {
                    self.best = Some((subset.to_vec(), score));
                }
            }
        }
    }
}

impl SelectionStrategy for RecursiveEliminationCv {
    fn name(&self) -> &'static str {
        "recursive-elimination-cv"
    }

    fn fit(&self, matrix: &FeatureMatrix, labels: &LabelVector) -> Result<StageOutcome> {
        labels.ensure_aligned(matrix)?;
        if matrix.n_features() == 0 {
            return Err(SelectionError::invalid_input(
                "Recursive elimination needs at least one feature",
            ));
        }

        let mut search = RfeSearch {
            config: self,
            matrix,
            labels,
            folds: self.cv.folds_for(labels)?,
            tracker: self.budget.start(),
            best: None,
            stale_rounds: 0,
            budget_exhausted: false,
        };

        let mut state = RfeState::Initial;
        while state != RfeState::Terminal {
            state = search.step(state)?;
        }

        // a budget spent before the first evaluation keeps the full set
        let (selected, score) = match search.best {
            Some((subset, score)) => (subset, Some(score)),
            None if search.budget_exhausted => ((0..matrix.n_features()).collect(), None),
            None => {
                return Err(SelectionError::convergence(
                    "Recursive elimination finished without evaluating a subset",
                ))
            }
        };

        let mut outcome = StageOutcome::one_shot(selected);
        outcome.best_cv_score = score;
        outcome.iterations = search.tracker.used();
        outcome.budget_exhausted = search.budget_exhausted;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::models::LogisticConfig;

    fn dominant_feature_data() -> (FeatureMatrix, LabelVector) {
        let n = 60;
        let signal: Vec<f64> = (0..n).map(|i| (i as f64 - 30.0) / 10.0).collect();
        let labels: Vec<i64> = (0..n).map(|i| i64::from(i >= 30)).collect();
        let noise = |seed: usize| -> Vec<f64> {
            (0..n).map(|i| (((i + seed) * 7919 + seed * 31) % 17) as f64 / 17.0).collect()
        };
        let m = FeatureMatrix::from_columns(
            vec!["noise_a".into(), "signal".into(), "noise_b".into(), "noise_c".into()],
            vec![noise(1), signal, noise(2), noise(3)],
        )
        .unwrap();
        (m, LabelVector::from_integers(&labels))
    }

    fn selector() -> RecursiveEliminationCv {
        RecursiveEliminationCv {
            estimator: EstimatorKind::Logistic(LogisticConfig {
                alpha: 0.001,
                ..Default::default()
            }),
            cv: CvSettings::default(),
            min_features_to_select: 1,
            step: 1,
            patience: None,
            tolerance: 1e-4,
            budget: IterationBudget::default(),
        }
    }

    #[test]
    fn test_keeps_dominant_feature() {
        let (m, labels) = dominant_feature_data();
        let outcome = selector().fit(&m, &labels).unwrap();
        assert!(outcome.selected.contains(&1));
        assert_eq!(outcome.iterations, 4);
        assert!(!outcome.budget_exhausted);
    }

    #[test]
    fn test_budget_stops_search() {
        let (m, labels) = dominant_feature_data();
        let mut rfe = selector();
        rfe.budget.max_iterations = 2;
        let outcome = rfe.fit(&m, &labels).unwrap();
        assert!(outcome.budget_exhausted);
        assert_eq!(outcome.iterations, 2);
        assert!(outcome.selected.len() >= 3);
    }

    #[test]
    fn test_elapsed_timeout_keeps_full_set() {
        let (m, labels) = dominant_feature_data();
        let mut rfe = selector();
        rfe.budget.timeout = Some(std::time::Duration::ZERO);
        let outcome = rfe.fit(&m, &labels).unwrap();
        assert!(outcome.budget_exhausted);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.selected, vec![0, 1, 2, 3]);
        assert_eq!(outcome.best_cv_score, None);
    }
}
