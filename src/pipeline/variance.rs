//! Low-variance feature filtering

use super::error::{Result, SelectionError};
use super::matrix::FeatureMatrix;

/// Default minimum variance - drops constant and near-constant features
pub const DEFAULT_MIN_VARIANCE: f64 = 1e-8;

/// Features whose population variance is below `min_variance`, sorted by
/// variance ascending (ties by name).
pub fn low_variance_features(matrix: &FeatureMatrix, min_variance: f64) -> Result<Vec<(String, f64)>> {
    if min_variance.is_nan() || min_variance < 0.0 {
        return Err(SelectionError::invalid_config(format!(
            "Minimum variance must be a non-negative number, got {}",
            min_variance
        )));
    }

    let mut low: Vec<(String, f64)> = matrix
        .feature_names()
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), matrix.variance(i)))
        .filter(|(_, var)| *var < min_variance)
        .collect();

    low.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    Ok(low)
}

/// Drop every feature whose variance across samples is below `min_variance`.
///
/// With `min_variance = 0` nothing is removed.
pub fn filter_low_variance(matrix: &FeatureMatrix, min_variance: f64) -> Result<FeatureMatrix> {
    let low = low_variance_features(matrix, min_variance)?;
    if low.is_empty() {
        return Ok(matrix.clone());
    }

    let keep: Vec<usize> = (0..matrix.n_features())
        .filter(|&i| matrix.variance(i) >= min_variance)
        .collect();

    Ok(matrix.select_columns(&keep))
}
