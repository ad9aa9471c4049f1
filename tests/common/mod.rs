//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::path::PathBuf;

use featsel::pipeline::{FeatureMatrix, LabelVector};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

/// Five features where `feature_b` duplicates `feature_a` under another name
/// and the other three are weakly correlated (|r| < 0.61).
pub fn create_redundancy_matrix() -> FeatureMatrix {
    let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    FeatureMatrix::from_columns(
        vec![
            "feature_a".into(),
            "feature_b".into(),
            "feature_c".into(),
            "feature_d".into(),
            "feature_e".into(),
        ],
        vec![
            a.clone(),
            a,
            vec![8.0, 1.0, 6.0, 3.0, 5.0, 7.0, 2.0, 4.0],
            vec![2.0, 7.0, 1.0, 8.0, 2.0, 8.0, 1.0, 8.0],
            vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0],
        ],
    )
    .unwrap()
}

/// Random matrix built from a few latent bases: every feature is a noisy
/// scaled copy of one base, so groups of features are strongly correlated.
pub fn create_grouped_matrix(rows: usize, bases: usize, per_base: usize, seed: u64) -> FeatureMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let latent: Vec<Vec<f64>> = (0..bases)
        .map(|_| (0..rows).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect();

    let mut names = Vec::new();
    let mut columns = Vec::new();
    for (b, base) in latent.iter().enumerate() {
        for j in 0..per_base {
            let scale = rng.gen_range(0.5..3.0);
            let noise = 0.05 * (j as f64);
            let column = base
                .iter()
                .map(|v| scale * v + noise * rng.gen_range(-1.0..1.0))
                .collect();
            names.push(format!("g{}_f{}", b, j));
            columns.push(column);
        }
    }

    FeatureMatrix::from_columns(names, columns).unwrap()
}

/// Binary classification data: `signal` separates the classes cleanly, the
/// `noise_*` features are seeded uniform noise.
pub fn create_classification_data(rows: usize, n_noise: usize) -> (FeatureMatrix, LabelVector) {
    let mut rng = StdRng::seed_from_u64(42);
    let labels: Vec<i64> = (0..rows).map(|i| (i % 2) as i64).collect();

    let mut names = Vec::new();
    let mut columns = Vec::new();
    for j in 0..n_noise {
        names.push(format!("noise_{}", j));
        columns.push((0..rows).map(|_| rng.gen::<f64>()).collect());
    }

    names.push("signal".to_string());
    columns.push(
        labels
            .iter()
            .enumerate()
            .map(|(i, &y)| y as f64 * 3.0 + ((i * 7) % 5) as f64 * 0.1)
            .collect(),
    );

    let matrix = FeatureMatrix::from_columns(names, columns).unwrap();
    (matrix, LabelVector::from_integers(&labels))
}

/// Create a simple test DataFrame with known characteristics for testing
///
/// This DataFrame includes:
/// - `sample_id`: Unique sample identifiers
/// - `target`: Binary target column (0/1)
/// - `feature_good`: Separates the classes
/// - `feature_corr`: `feature_good` shifted by a constant (correlation 1.0)
/// - `feature_constant`: Zero variance
/// - `feature_noise`: No relation to the target
pub fn create_test_dataframe() -> DataFrame {
    df! {
        "sample_id" => ["m01", "m02", "m03", "m04", "m05", "m06", "m07", "m08", "m09", "m10", "m11", "m12"],
        "target" => [0i32, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
        "feature_good" => [1.0f64, 9.0, 1.5, 9.5, 2.0, 10.0, 1.2, 9.2, 1.7, 9.7, 2.2, 10.2],
        "feature_corr" => [1.1f64, 9.1, 1.6, 9.6, 2.1, 10.1, 1.3, 9.3, 1.8, 9.8, 2.3, 10.3],
        "feature_constant" => [5.0f64; 12],
        "feature_noise" => [3.0f64, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 5.0, 8.0],
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that no two features of `matrix` have similarity >= `threshold`
pub fn assert_no_similar_pairs(matrix: &FeatureMatrix, threshold: f64) {
    let n = matrix.n_features();
    for i in 0..n {
        for j in (i + 1)..n {
            let sim = featsel::pipeline::correlation::column_correlation(
                matrix.column(i),
                matrix.column(j),
            )
            .abs();
            assert!(
                sim < threshold,
                "'{}' and '{}' both retained with similarity {:.4} >= {}",
                matrix.feature_names()[i],
                matrix.feature_names()[j],
                sim,
                threshold
            );
        }
    }
}
