//! Univariate feature scores against class labels
//!
//! Each function scores every feature independently; higher means more
//! informative about the labels.

use rayon::prelude::*;
use serde::Serialize;

use super::error::{Result, SelectionError};
use super::matrix::{FeatureMatrix, LabelVector};

/// Maximum equal-frequency bins used to discretize a feature for mutual
/// information
const MI_MAX_BINS: usize = 10;

/// Statistical test used by univariate selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ScoringFunction {
    /// Chi-square statistic between non-negative features and classes
    ChiSquare,
    /// ANOVA F-value between feature and classes (default)
    #[default]
    FClassif,
    /// Mutual information between the discretized feature and classes
    MutualInformation,
}

impl std::fmt::Display for ScoringFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringFunction::ChiSquare => write!(f, "chi-square"),
            ScoringFunction::FClassif => write!(f, "f-classif"),
            ScoringFunction::MutualInformation => write!(f, "mutual-information"),
        }
    }
}

impl std::str::FromStr for ScoringFunction {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "chi-square" | "chi2" | "chi-squared" => Ok(ScoringFunction::ChiSquare),
            "f-classif" | "anova" => Ok(ScoringFunction::FClassif),
            "mutual-information" | "mutual-info" | "mi" => Ok(ScoringFunction::MutualInformation),
            _ => Err(SelectionError::invalid_config(format!(
                "Unknown scoring function: '{}'. Use 'chi-square', 'f-classif' or 'mutual-information'.",
                s
            ))),
        }
    }
}

impl ScoringFunction {
    /// Score every feature of `matrix`, in column order.
    pub fn score(&self, matrix: &FeatureMatrix, labels: &LabelVector) -> Result<Vec<f64>> {
        labels.ensure_aligned(matrix)?;
        match self {
            ScoringFunction::ChiSquare => chi_square_scores(matrix, labels),
            ScoringFunction::FClassif => Ok(f_classif_scores(matrix, labels)),
            ScoringFunction::MutualInformation => Ok(mutual_information_scores(matrix, labels)),
        }
    }
}

/// Chi-square statistic of each feature treated as class-wise frequencies.
///
/// Features must be non-negative. A feature that sums to zero scores 0.
pub fn chi_square_scores(matrix: &FeatureMatrix, labels: &LabelVector) -> Result<Vec<f64>> {
    if let Some((name, _)) = matrix
        .feature_names()
        .iter()
        .zip(matrix.columns())
        .find(|(_, col)| col.iter().any(|v| *v < 0.0))
    {
        return Err(SelectionError::invalid_input(format!(
            "Chi-square scoring needs non-negative features, '{}' has negative values",
            name
        )));
    }

    let n = labels.len() as f64;
    let class_probs: Vec<f64> = labels
        .class_counts()
        .iter()
        .map(|&c| c as f64 / n)
        .collect();

    let scores = matrix
        .columns()
        .par_iter()
        .map(|col| {
            let mut observed = vec![0.0; class_probs.len()];
            for (&v, &code) in col.iter().zip(labels.codes()) {
                observed[code] += v;
            }
            let total: f64 = observed.iter().sum();
            if total <= 0.0 {
                return 0.0;
            }
            observed
                .iter()
                .zip(class_probs.iter())
                .filter(|(_, &p)| p > 0.0)
                .map(|(&obs, &p)| {
                    let expected = p * total;
                    (obs - expected) * (obs - expected) / expected
                })
                .sum()
        })
        .collect();

    Ok(scores)
}

/// One-way ANOVA F-value of each feature across classes.
///
/// Zero within-class variance with non-zero between-class variance is a
/// perfect separator and scores `f64::MAX`; no variance at all scores 0.
pub fn f_classif_scores(matrix: &FeatureMatrix, labels: &LabelVector) -> Vec<f64> {
    let counts = labels.class_counts();
    let present = counts.iter().filter(|&&c| c > 0).count();
    let n = labels.len();

    if present < 2 || n <= present {
        return vec![0.0; matrix.n_features()];
    }

    matrix
        .columns()
        .par_iter()
        .map(|col| {
            let mut sums = vec![0.0; counts.len()];
            for (&v, &code) in col.iter().zip(labels.codes()) {
                sums[code] += v;
            }
            let grand_mean = col.iter().sum::<f64>() / n as f64;

            let mut ss_between = 0.0;
            for (sum, &count) in sums.iter().zip(counts.iter()) {
                if count > 0 {
                    let class_mean = sum / count as f64;
                    ss_between += count as f64 * (class_mean - grand_mean).powi(2);
                }
            }

            let mut ss_within = 0.0;
            for (&v, &code) in col.iter().zip(labels.codes()) {
                let class_mean = sums[code] / counts[code] as f64;
                ss_within += (v - class_mean).powi(2);
            }

            let df_between = (present - 1) as f64;
            let df_within = (n - present) as f64;

            if ss_within <= f64::EPSILON * ss_between.max(1.0) {
                return if ss_between > 0.0 { f64::MAX } else { 0.0 };
            }

            (ss_between / df_between) / (ss_within / df_within)
        })
        .collect()
}

/// Mutual information (nats) between each feature, discretized into
/// equal-frequency bins, and the class labels.
pub fn mutual_information_scores(matrix: &FeatureMatrix, labels: &LabelVector) -> Vec<f64> {
    let n_classes = labels.n_classes();
    let n = labels.len() as f64;

    matrix
        .columns()
        .par_iter()
        .map(|col| {
            let bins = quantile_bins(col, MI_MAX_BINS);
            let n_bins = bins.iter().copied().max().map(|b| b + 1).unwrap_or(0);

            let mut joint = vec![vec![0.0; n_classes]; n_bins];
            for (&bin, &code) in bins.iter().zip(labels.codes()) {
                joint[bin][code] += 1.0;
            }

            let class_totals: Vec<f64> = (0..n_classes)
                .map(|c| joint.iter().map(|row| row[c]).sum())
                .collect();

            let mut mi = 0.0;
            for row in &joint {
                let bin_total: f64 = row.iter().sum();
                for (c, &count) in row.iter().enumerate() {
                    if count > 0.0 {
                        mi += (count / n) * ((count * n) / (bin_total * class_totals[c])).ln();
                    }
                }
            }
            mi.max(0.0)
        })
        .collect()
}

/// Assign each value to an equal-frequency bin. Equal values always share a
/// bin, so a feature with few distinct values gets fewer bins.
fn quantile_bins(values: &[f64], max_bins: usize) -> Vec<usize> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let per_bin = (n as f64 / max_bins as f64).max(1.0);
    let mut bins = vec![0usize; n];
    let mut current = 0usize;

    for (rank, &idx) in order.iter().enumerate() {
        if rank > 0 {
            let prev = order[rank - 1];
            let target = ((rank as f64) / per_bin) as usize;
            if values[idx] != values[prev] && target > current {
                current = target.min(max_bins - 1);
            }
        }
        bins[idx] = current;
    }

    // compact bin ids so they are contiguous
    let mut remap = vec![usize::MAX; max_bins];
    let mut next = 0;
    for &idx in &order {
        let b = bins[idx];
        if remap[b] == usize::MAX {
            remap[b] = next;
            next += 1;
        }
    }
    bins.iter().map(|&b| remap[b]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (FeatureMatrix, LabelVector) {
        let m = FeatureMatrix::from_columns(
            vec!["signal".into(), "noise".into()],
            vec![
                vec![1.0, 1.2, 0.9, 1.1, 5.0, 5.2, 4.9, 5.1],
                vec![3.0, 1.0, 2.0, 4.0, 4.0, 2.0, 1.0, 3.0],
            ],
        )
        .unwrap();
        let labels = LabelVector::from_integers(&[0, 0, 0, 0, 1, 1, 1, 1]);
        (m, labels)
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("chi2".parse::<ScoringFunction>().unwrap(), ScoringFunction::ChiSquare);
        assert_eq!("f_classif".parse::<ScoringFunction>().unwrap(), ScoringFunction::FClassif);
        assert_eq!(
            "mutual_info".parse::<ScoringFunction>().unwrap(),
            ScoringFunction::MutualInformation
        );
        assert!(matches!(
            "pearson".parse::<ScoringFunction>(),
            Err(SelectionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_all_scores_rank_signal_first() {
        let (m, labels) = fixture();
        for scoring in [
            ScoringFunction::ChiSquare,
            ScoringFunction::FClassif,
            ScoringFunction::MutualInformation,
        ] {
            let scores = scoring.score(&m, &labels).unwrap();
            assert!(
                scores[0] > scores[1],
                "{} should rank signal above noise: {:?}",
                scoring,
                scores
            );
        }
    }

    #[test]
    fn test_noise_has_zero_f_value() {
        let (m, labels) = fixture();
        let scores = f_classif_scores(&m, &labels);
        // noise has identical class means (2.5 vs 2.5)
        assert!(scores[1].abs() < 1e-12);
    }

    #[test]
    fn test_chi_square_rejects_negative_values() {
        let m = FeatureMatrix::from_columns(vec!["neg".into()], vec![vec![-1.0, 1.0]]).unwrap();
        let labels = LabelVector::from_integers(&[0, 1]);
        assert!(matches!(
            chi_square_scores(&m, &labels),
            Err(SelectionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_quantile_bins_keep_ties_together() {
        let bins = quantile_bins(&[1.0, 1.0, 1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(bins[0], bins[1]);
        assert_eq!(bins[1], bins[2]);
        assert!(bins[5] > bins[0]);
        assert!(*bins.iter().max().unwrap() < 3);
    }

    #[test]
    fn test_mutual_information_of_constant_is_zero() {
        let m = FeatureMatrix::from_columns(vec!["c".into()], vec![vec![2.0; 6]]).unwrap();
        let labels = LabelVector::from_integers(&[0, 1, 0, 1, 0, 1]);
        let scores = mutual_information_scores(&m, &labels);
        assert!(scores[0].abs() < 1e-12);
    }
}
