//! Small numeric helpers shared by the selection stages

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by n), matching the usual variance-threshold
/// convention. Two-pass for numerical stability.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Index of the largest value; ties resolve to the lowest index.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        match best {
            Some(b) if values[b] >= *v => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Mean and population standard deviation per column, used to standardize
/// training data. Zero-variance columns get a scale of 1.0 so they map to 0.
pub fn column_moments(columns: &[Vec<f64>]) -> Vec<(f64, f64)> {
    columns
        .iter()
        .map(|col| {
            let m = mean(col);
            let s = std_dev(col);
            (m, if s > 0.0 { s } else { 1.0 })
        })
        .collect()
}
