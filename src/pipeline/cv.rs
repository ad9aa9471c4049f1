//! Cross-validation folds and scoring
//!
//! Folds are built once per selection stage so every candidate subset is
//! compared on the same partitions. Folds are independent and are evaluated
//! in parallel, then averaged.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use super::error::{Result, SelectionError};
use super::matrix::{FeatureMatrix, LabelVector};
use super::models::EstimatorKind;

/// Metric averaged across cross-validation folds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CvMetric {
    #[default]
    Accuracy,
    /// Mean per-class recall over the classes present in the test fold
    BalancedAccuracy,
}

impl std::fmt::Display for CvMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CvMetric::Accuracy => write!(f, "accuracy"),
            CvMetric::BalancedAccuracy => write!(f, "balanced-accuracy"),
        }
    }
}

impl std::str::FromStr for CvMetric {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "accuracy" => Ok(CvMetric::Accuracy),
            "balanced-accuracy" => Ok(CvMetric::BalancedAccuracy),
            _ => Err(SelectionError::invalid_config(format!(
                "Unknown cross-validation metric: '{}'. Use 'accuracy' or 'balanced-accuracy'.",
                s
            ))),
        }
    }
}

impl CvMetric {
    pub fn evaluate(&self, truth: &[usize], predicted: &[usize], n_classes: usize) -> f64 {
        if truth.is_empty() {
            return 0.0;
        }
        match self {
            CvMetric::Accuracy => {
                let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
                correct as f64 / truth.len() as f64
            }
            CvMetric::BalancedAccuracy => {
                let mut hits = vec![0usize; n_classes];
                let mut totals = vec![0usize; n_classes];
                for (&t, &p) in truth.iter().zip(predicted) {
                    totals[t] += 1;
                    if t == p {
                        hits[t] += 1;
                    }
                }
                let recalls: Vec<f64> = hits
                    .iter()
                    .zip(totals.iter())
                    .filter(|(_, &total)| total > 0)
                    .map(|(&h, &total)| h as f64 / total as f64)
                    .collect();
                recalls.iter().sum::<f64>() / recalls.len() as f64
            }
        }
    }
}

/// One train/test partition of the sample rows
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partition samples into `n_folds` folds.
///
/// Rows are shuffled with `seed`. Stratified folds deal each class's rows
/// round-robin across folds so class proportions are preserved to within
/// one sample per fold.
///
/// Fails with `InvalidInput` when there are fewer samples than folds and
/// with `Convergence` when any training split holds a single class.
pub fn build_folds(labels: &LabelVector, n_folds: usize, stratified: bool, seed: u64) -> Result<Vec<Fold>> {
    if n_folds < 2 {
        return Err(SelectionError::invalid_config(format!(
            "Cross-validation needs at least 2 folds, got {}",
            n_folds
        )));
    }
    let n = labels.len();
    if n < n_folds {
        return Err(SelectionError::invalid_input(format!(
            "Cannot split {} samples into {} folds",
            n, n_folds
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut assignment = vec![0usize; n];

    if stratified {
        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); labels.n_classes()];
        for (row, &code) in labels.codes().iter().enumerate() {
            by_class[code].push(row);
        }
        // a running counter across classes keeps fold sizes balanced
        let mut next = 0usize;
        for rows in by_class.iter_mut() {
            rows.shuffle(&mut rng);
            for &row in rows.iter() {
                assignment[row] = next % n_folds;
                next += 1;
            }
        }
    } else {
        let mut rows: Vec<usize> = (0..n).collect();
        rows.shuffle(&mut rng);
        for (pos, &row) in rows.iter().enumerate() {
            assignment[row] = pos % n_folds;
        }
    }

    let folds: Vec<Fold> = (0..n_folds)
        .map(|k| {
            let (test, train): (Vec<usize>, Vec<usize>) = (0..n).partition(|&r| assignment[r] == k);
            Fold { train, test }
        })
        .collect();

    for (k, fold) in folds.iter().enumerate() {
        let mut seen = vec![false; labels.n_classes()];
        for &r in &fold.train {
            seen[labels.codes()[r]] = true;
        }
        if seen.iter().filter(|&&s| s).count() < 2 {
            return Err(SelectionError::convergence(format!(
                "Training split of fold {} contains a single class",
                k + 1
            )));
        }
    }

    Ok(folds)
}

/// Mean cross-validated score of `estimator` on the listed feature columns.
pub fn cross_val_score(
    estimator: &EstimatorKind,
    matrix: &FeatureMatrix,
    labels: &LabelVector,
    features: &[usize],
    folds: &[Fold],
    metric: CvMetric,
) -> Result<f64> {
    if features.is_empty() {
        return Err(SelectionError::invalid_input(
            "Cannot cross-validate an empty feature subset",
        ));
    }

    let scores = folds
        .par_iter()
        .map(|fold| {
            let train_x = matrix.select_block(&fold.train, features);
            let train_y = labels.select_rows(&fold.train);
            let test_x = matrix.select_block(&fold.test, features);
            let test_y = labels.select_rows(&fold.test);

            let mut model = estimator.build();
            model.fit(&train_x, &train_y)?;
            let predicted = model.predict(&test_x);
            Ok(metric.evaluate(test_y.codes(), &predicted, labels.n_classes()))
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(scores.iter().sum::<f64>() / scores.len() as f64)
}
