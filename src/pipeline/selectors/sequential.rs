//! Sequential (greedy) forward and backward selection
//!
//! Each step tries every single-feature addition (forward) or removal
//! (backward), scores the candidates by cross-validation and commits the
//! best one. The search stops when the best candidate gains less than the
//! tolerance, when the requested size is reached, or when the iteration
//! budget runs out.

use serde::Serialize;

use super::{CvSettings, SelectionStrategy, StageOutcome};
use crate::pipeline::budget::{BudgetTracker, IterationBudget};
use crate::pipeline::cv::{cross_val_score, Fold};
use crate::pipeline::error::{Result, SelectionError};
use crate::pipeline::matrix::{FeatureMatrix, LabelVector};
use crate::pipeline::models::EstimatorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequentialSelector {
    pub direction: Direction,
    pub estimator: EstimatorKind,
    pub cv: CvSettings,
    /// Stop at exactly this many features instead of using the tolerance
    pub n_features_to_select: Option<usize>,
    pub tolerance: f64,
    pub budget: IterationBudget,
}

#[derive(Debug, Clone, PartialEq)]
enum SequentialState {
    Initial,
    Stepping { selected: Vec<usize>, score: f64 },
    Terminal { selected: Vec<usize>, score: f64 },
}

struct SequentialSearch<'a> {
    config: &'a SequentialSelector,
    matrix: &'a FeatureMatrix,
    labels: &'a LabelVector,
    folds: Vec<Fold>,
    tracker: BudgetTracker,
    budget_exhausted: bool,
}

impl<'a> SequentialSearch<'a> {
    fn score(&self, subset: &[usize]) -> Result<f64> {
        cross_val_score(
            &self.config.estimator,
            self.matrix,
            self.labels,
            subset,
            &self.folds,
            self.config.cv.metric,
        )
    }

    fn target_reached(&self, size: usize) -> bool {
        match (self.config.n_features_to_select, self.config.direction) {
            (Some(n), Direction::Forward) => size >= n.min(self.matrix.n_features()),
            (Some(n), Direction::Backward) => size <= n,
            (None, Direction::Backward) => size <= 1,
            (None, Direction::Forward) => size >= self.matrix.n_features(),
        }
    }

    fn step(&mut self, state: SequentialState) -> Result<SequentialState> {
        match state {
            SequentialState::Initial => match self.config.direction {
                Direction::Forward => Ok(SequentialState::Stepping {
                    selected: Vec::new(),
                    score: f64::NEG_INFINITY,
                }),
                Direction::Backward => {
                    let all: Vec<usize> = (0..self.matrix.n_features()).collect();
                    let score = self.score(&all)?;
                    Ok(SequentialState::Stepping { selected: all, score })
                }
            },

            SequentialState::Stepping { selected, score } => {
                if self.target_reached(selected.len()) {
                    return Ok(SequentialState::Terminal { selected, score });
                }
                if !self.tracker.try_consume() {
                    self.budget_exhausted = true;
                    return Ok(SequentialState::Terminal { selected, score });
                }

                let candidates: Vec<Vec<usize>> = match self.config.direction {
                    Direction::Forward => (0..self.matrix.n_features())
                        .filter(|f| !selected.contains(f))
                        .map(|f| {
                            let mut next = selected.clone();
                            next.push(f);
                            next.sort_unstable();
                            next
                        })
                        .collect(),
                    Direction::Backward => (0..selected.len())
                        .map(|pos| {
                            let mut next = selected.clone();
                            next.remove(pos);
                            next
                        })
                        .collect(),
                };

                let mut best: Option<(Vec<usize>, f64)> = None;
                for candidate in candidates {
                    let candidate_score = self.score(&candidate)?;
                    let better = best
                        .as_ref()
                        .map(|(_, s)| candidate_score > *s)
                        .unwrap_or(true);
                    if better {
                        best = Some((candidate, candidate_score));
                    }
                }

                let Some((next, next_score)) = best else {
                    return Ok(SequentialState::Terminal { selected, score });
                };

                log::debug!(
                    "sequential {:?} step {}: {} features, cv score {:.4}",
                    self.config.direction,
                    self.tracker.used(),
                    next.len(),
                    next_score
                );

                // the first forward step always commits; after that a step
                // must clear the tolerance unless a fixed size was requested
                let must_improve = self.config.n_features_to_select.is_none() && !selected.is_empty();
                if must_improve && next_score - score < self.config.tolerance {
                    return Ok(SequentialState::Terminal { selected, score });
                }

                Ok(SequentialState::Stepping {
                    selected: next,
                    score: next_score,
                })
            }

            terminal @ SequentialState::Terminal { .. } => Ok(terminal),
        }
    }
}

impl SelectionStrategy for SequentialSelector {
    fn name(&self) -> &'static str {
        match self.direction {
            Direction::Forward => "sequential-forward",
            Direction::Backward => "sequential-backward",
        }
    }

    fn fit(&self, matrix: &FeatureMatrix, labels: &LabelVector) -> Result<StageOutcome> {
        labels.ensure_aligned(matrix)?;
        if matrix.n_features() == 0 {
            return Err(SelectionError::invalid_input(
                "Sequential selection needs at least one feature",
            ));
        }

        let mut search = SequentialSearch {
            config: self,
            matrix,
            labels,
            folds: self.cv.folds_for(labels)?,
            tracker: self.budget.start(),
            budget_exhausted: false,
        };

        let mut state = SequentialState::Initial;
        let (selected, score) = loop {
            match search.step(state)? {
                SequentialState::Terminal { selected, score } => break (selected, score),
                next => state = next,
            }
        };

        // a forward search stopped before its first step keeps the full set
        let selected = if selected.is_empty() && search.budget_exhausted {
            (0..matrix.n_features()).collect()
        } else {
            selected
        };

        let mut outcome = StageOutcome::one_shot(selected);
        outcome.best_cv_score = score.is_finite().then_some(score);
        outcome.iterations = search.tracker.used();
        outcome.budget_exhausted = search.budget_exhausted;
        Ok(outcome)
    }
}
