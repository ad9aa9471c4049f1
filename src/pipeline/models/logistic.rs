//! L1-regularized logistic regression
//!
//! Fitted by proximal gradient descent (ISTA) on standardized features.
//! Binary problems fit a single model for the higher class code; multiclass
//! problems fit one-vs-rest.

use serde::Serialize;

use super::{check_trainable, Classifier};
use crate::pipeline::error::Result;
use crate::pipeline::matrix::{FeatureMatrix, LabelVector};
use crate::pipeline::stats::column_moments;

/// Hyperparameters for [`L1LogisticRegression`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogisticConfig {
    /// L1 penalty strength on the mean log-loss
    pub alpha: f64,
    /// Maximum proximal gradient iterations per binary model
    pub max_iter: usize,
    /// Stop when no coefficient moves more than this
    pub tol: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            alpha: 0.01,
            max_iter: 500,
            tol: 1e-6,
        }
    }
}

/// Coefficients of one binary (one-vs-rest) model
#[derive(Debug, Clone, Default)]
struct BinaryModel {
    weights: Vec<f64>,
    intercept: f64,
}

impl BinaryModel {
    fn decision(&self, z_row: &[f64]) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(z_row.iter())
                .map(|(w, z)| w * z)
                .sum::<f64>()
    }
}

#[derive(Debug, Clone)]
pub struct L1LogisticRegression {
    config: LogisticConfig,
    moments: Vec<(f64, f64)>,
    models: Vec<BinaryModel>,
    n_classes: usize,
}

impl L1LogisticRegression {
    pub fn new(config: LogisticConfig) -> Self {
        Self {
            config,
            moments: Vec::new(),
            models: Vec::new(),
            n_classes: 0,
        }
    }

    /// Standardized coefficients, one vector per fitted binary model.
    pub fn coefficients(&self) -> Vec<Vec<f64>> {
        self.models.iter().map(|m| m.weights.clone()).collect()
    }

    fn standardize(&self, x: &FeatureMatrix) -> Vec<Vec<f64>> {
        x.columns()
            .iter()
            .zip(self.moments.iter())
            .map(|(col, &(mean, scale))| col.iter().map(|v| (v - mean) / scale).collect())
            .collect()
    }

    fn fit_binary(&self, z: &[Vec<f64>], targets: &[f64]) -> BinaryModel {
        let n = targets.len() as f64;
        let p = z.len();

        // standardized columns have unit mean square, so the log-loss
        // gradient is Lipschitz with constant at most (p + 1) / 4
        let step = 4.0 / (p as f64 + 1.0);
        let shrink = step * self.config.alpha;

        let prevalence = (targets.iter().sum::<f64>() / n).clamp(1e-6, 1.0 - 1e-6);
        let mut model = BinaryModel {
            weights: vec![0.0; p],
            intercept: (prevalence / (1.0 - prevalence)).ln(),
        };

        let mut decision = vec![0.0; targets.len()];
        let mut residual = vec![0.0; targets.len()];

        for _ in 0..self.config.max_iter {
            for (i, d) in decision.iter_mut().enumerate() {
                *d = model.intercept;
                for (j, col) in z.iter().enumerate() {
                    *d += model.weights[j] * col[i];
                }
            }
            for ((r, &d), &t) in residual.iter_mut().zip(decision.iter()).zip(targets.iter()) {
                *r = sigmoid(d) - t;
            }

            let mut max_change: f64 = 0.0;

            for (j, col) in z.iter().enumerate() {
                let grad = col.iter().zip(residual.iter()).map(|(z, r)| z * r).sum::<f64>() / n;
                let updated = soft_threshold(model.weights[j] - step * grad, shrink);
                max_change = max_change.max((updated - model.weights[j]).abs());
                model.weights[j] = updated;
            }

            let grad_b = residual.iter().sum::<f64>() / n;
            let delta_b = step * grad_b;
            model.intercept -= delta_b;
            max_change = max_change.max(delta_b.abs());

            if max_change < self.config.tol {
                break;
            }
        }

        model
    }
}

impl Classifier for L1LogisticRegression {
    fn fit(&mut self, x: &FeatureMatrix, y: &LabelVector) -> Result<()> {
        check_trainable(x, y)?;

        self.moments = column_moments(x.columns());
        self.n_classes = y.n_classes();
        let z = self.standardize(x);

        let positive_classes: Vec<usize> = if self.n_classes == 2 {
            vec![1]
        } else {
            (0..self.n_classes).collect()
        };

        self.models = positive_classes
            .iter()
            .map(|&class| {
                let targets: Vec<f64> = y
                    .codes()
                    .iter()
                    .map(|&c| if c == class { 1.0 } else { 0.0 })
                    .collect();
                self.fit_binary(&z, &targets)
            })
            .collect();

        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Vec<usize> {
        let z = self.standardize(x);
        let n_features = z.len();
        let mut row = vec![0.0; n_features];

        (0..x.n_samples())
            .map(|i| {
                for (j, col) in z.iter().enumerate() {
                    row[j] = col[i];
                }
                if self.n_classes == 2 {
                    usize::from(self.models[0].decision(&row) >= 0.0)
                } else {
                    let mut best = 0;
                    let mut best_score = f64::NEG_INFINITY;
                    for (class, model) in self.models.iter().enumerate() {
                        let score = model.decision(&row);
                        if score > best_score {
                            best = class;
                            best_score = score;
                        }
                    }
                    best
                }
            })
            .collect()
    }

    /// Sum of absolute standardized coefficients across binary models.
    fn feature_importances(&self) -> Vec<f64> {
        let p = self.moments.len();
        let mut importances = vec![0.0; p];
        for model in &self.models {
            for (imp, w) in importances.iter_mut().zip(model.weights.iter()) {
                *imp += w.abs();
            }
        }
        importances
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[inline]
fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::error::SelectionError;

    fn separable() -> (FeatureMatrix, LabelVector) {
        let signal: Vec<f64> = (0..40).map(|i| if i < 20 { -1.0 - i as f64 * 0.05 } else { 1.0 + i as f64 * 0.05 }).collect();
        let noise: Vec<f64> = (0..40).map(|i| ((i * 7919) % 13) as f64 / 13.0).collect();
        let labels: Vec<i64> = (0..40).map(|i| i64::from(i >= 20)).collect();
        let m = FeatureMatrix::from_columns(vec!["signal".into(), "noise".into()], vec![signal, noise]).unwrap();
        (m, LabelVector::from_integers(&labels))
    }

    #[test]
    fn test_soft_threshold() {
        assert_eq!(soft_threshold(0.5, 0.2), 0.3);
        assert_eq!(soft_threshold(-0.5, 0.2), -0.3);
        assert_eq!(soft_threshold(0.1, 0.2), 0.0);
    }

    #[test]
    fn test_fits_separable_data() {
        let (m, labels) = separable();
        let mut model = L1LogisticRegression::new(LogisticConfig::default());
        model.fit(&m, &labels).unwrap();

        let predictions = model.predict(&m);
        assert_eq!(predictions, labels.codes());

        let importances = model.feature_importances();
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_strong_penalty_zeroes_coefficients() {
        let (m, labels) = separable();
        let mut model = L1LogisticRegression::new(LogisticConfig {
            alpha: 10.0,
            ..Default::default()
        });
        model.fit(&m, &labels).unwrap();
        assert!(model.feature_importances().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_single_class_is_convergence_error() {
        let m = FeatureMatrix::from_columns(vec!["a".into()], vec![vec![1.0, 2.0, 3.0]]).unwrap();
        let labels = LabelVector::from_integers(&[1, 1, 1]);
        let mut model = L1LogisticRegression::new(LogisticConfig::default());
        assert!(matches!(
            model.fit(&m, &labels),
            Err(SelectionError::Convergence(_))
        ));
    }

    #[test]
    fn test_multiclass_one_vs_rest() {
        let x: Vec<f64> = (0..30).map(|i| (i / 10) as f64 * 3.0 + (i % 10) as f64 * 0.05).collect();
        let labels: Vec<i64> = (0..30).map(|i| (i / 10) as i64).collect();
        let m = FeatureMatrix::from_columns(vec!["x".into()], vec![x]).unwrap();
        let labels = LabelVector::from_integers(&labels);

        let mut model = L1LogisticRegression::new(LogisticConfig {
            alpha: 0.0,
            max_iter: 2000,
            tol: 1e-8,
        });
        model.fit(&m, &labels).unwrap();
        assert_eq!(model.coefficients().len(), 3);

        let predictions = model.predict(&m);
        // one-vs-rest on a single axis recovers the outer classes
        assert_eq!(predictions[0], 0);
        assert_eq!(predictions[29], 2);
    }
}
