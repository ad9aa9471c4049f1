//! Pairwise feature similarity
//!
//! Similarity between two features is the absolute Pearson correlation of
//! their columns. Columns with exactly equal values are similarity 1.0 even
//! when constant (Pearson is undefined there); a constant column is otherwise
//! dissimilar to everything.

use faer::Mat;
use rayon::prelude::*;

use super::matrix::FeatureMatrix;

/// A pair of features whose similarity reached the threshold
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarPair {
    pub feature1: String,
    pub feature2: String,
    /// Signed Pearson correlation (1.0 for identical columns)
    pub correlation: f64,
}

impl SimilarPair {
    pub fn similarity(&self) -> f64 {
        self.correlation.abs()
    }
}

/// Threshold for auto-selecting matrix vs pairwise similarity computation.
/// Matrix multiplication is more efficient when there are many columns.
const MATRIX_METHOD_COLUMN_THRESHOLD: usize = 15;

/// Find all feature pairs with similarity >= `threshold`, computing each pair
/// independently in parallel.
pub fn find_similar_pairs(matrix: &FeatureMatrix, threshold: f64) -> Vec<SimilarPair> {
    let n = matrix.n_features();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();

    let similar: Vec<SimilarPair> = pairs
        .par_iter()
        .filter_map(|&(i, j)| {
            let corr = column_correlation(matrix.column(i), matrix.column(j));
            if corr.abs() >= threshold {
                Some(SimilarPair {
                    feature1: matrix.feature_names()[i].clone(),
                    feature2: matrix.feature_names()[j].clone(),
                    correlation: corr,
                })
            } else {
                None
            }
        })
        .collect();

    sort_by_similarity(similar)
}

/// Find similar pairs through a single standardized matrix product.
///
/// Algorithm:
/// 1. Standardize each non-constant column: z = (x - mean) / (std * sqrt(n))
/// 2. Correlation matrix R = Zᵀ Z
/// 3. Constant columns are compared directly for equality
pub fn find_similar_pairs_matrix(matrix: &FeatureMatrix, threshold: f64) -> Vec<SimilarPair> {
    let names = matrix.feature_names();
    let n_rows = matrix.n_samples();

    let standardized: Vec<Option<Vec<f64>>> = matrix
        .columns()
        .par_iter()
        .map(|col| standardize_column(col))
        .collect();

    let (varying, constant): (Vec<usize>, Vec<usize>) =
        (0..matrix.n_features()).partition(|&i| standardized[i].is_some());

    let mut similar = Vec::new();

    if varying.len() >= 2 && n_rows > 0 {
        let mut z = Mat::<f64>::zeros(n_rows, varying.len());
        for (col_idx, &feature) in varying.iter().enumerate() {
            if let Some(values) = &standardized[feature] {
                for (row_idx, &val) in values.iter().enumerate() {
                    z[(row_idx, col_idx)] = val;
                }
            }
        }

        let corr_matrix = z.transpose() * &z;

        for a in 0..varying.len() {
            for b in (a + 1)..varying.len() {
                let corr = corr_matrix[(a, b)].clamp(-1.0, 1.0);
                if corr.abs() >= threshold && !corr.is_nan() {
                    similar.push(SimilarPair {
                        feature1: names[varying[a]].clone(),
                        feature2: names[varying[b]].clone(),
                        correlation: corr,
                    });
                }
            }
        }
    }

    for (pos, &a) in constant.iter().enumerate() {
        for &b in &constant[pos + 1..] {
            if matrix.column(a) == matrix.column(b) && threshold <= 1.0 {
                let (first, second) = if a < b { (a, b) } else { (b, a) };
                similar.push(SimilarPair {
                    feature1: names[first].clone(),
                    feature2: names[second].clone(),
                    correlation: 1.0,
                });
            }
        }
    }

    sort_by_similarity(similar)
}

/// Find similar pairs using the method best suited to the column count.
pub fn find_similar_pairs_auto(matrix: &FeatureMatrix, threshold: f64) -> Vec<SimilarPair> {
    if matrix.n_features() >= MATRIX_METHOD_COLUMN_THRESHOLD {
        find_similar_pairs_matrix(matrix, threshold)
    } else {
        find_similar_pairs(matrix, threshold)
    }
}

/// Signed correlation used as the similarity measure.
///
/// Identical columns are 1.0; a pair involving a constant column that is not
/// identical to its partner is 0.0.
pub fn column_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x == y {
        return 1.0;
    }
    pearson_correlation(x, y).unwrap_or(0.0)
}

/// Pearson correlation using a single-pass Welford update.
///
/// Returns `None` when either column is constant or the lengths differ.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n == 0 || n != y.len() {
        return None;
    }

    let mut count = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (&xi, &yi) in x.iter().zip(y.iter()) {
        count += 1.0;
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        mean_x += dx / count;
        mean_y += dy / count;
        var_x += dx * (xi - mean_x);
        var_y += dy * (yi - mean_y);
        cov_xy += dx * (yi - mean_y);
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    Some((cov_xy / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

fn standardize_column(col: &[f64]) -> Option<Vec<f64>> {
    let n = col.len();
    if n == 0 {
        return None;
    }
    let mean = col.iter().sum::<f64>() / n as f64;
    let sum_sq_dev: f64 = col.iter().map(|x| (x - mean) * (x - mean)).sum();
    if sum_sq_dev <= 0.0 {
        return None;
    }
    let scale = sum_sq_dev.sqrt();
    Some(col.iter().map(|x| (x - mean) / scale).collect())
}

fn sort_by_similarity(mut pairs: Vec<SimilarPair>) -> Vec<SimilarPair> {
    pairs.sort_by(|a, b| {
        b.similarity()
            .total_cmp(&a.similarity())
            .then_with(|| a.feature1.cmp(&b.feature1))
            .then_with(|| a.feature2.cmp(&b.feature2))
    });
    pairs
}
