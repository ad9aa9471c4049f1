//! Tests for dataset loading and conversion to a feature matrix

use featsel::pipeline::{get_column_names, load_dataset, matrix_from_dataframe, SelectionError};
use polars::prelude::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_load_csv() {
    let mut df = common::create_test_dataframe();
    let (_temp_dir, path) = common::create_temp_csv(&mut df);

    let loaded = load_dataset(&path, 10000).unwrap();
    assert_eq!(loaded.shape(), (12, 6));
}

#[test]
fn test_load_parquet() {
    let mut df = common::create_test_dataframe();
    let (_temp_dir, path) = common::create_temp_parquet(&mut df);

    let loaded = load_dataset(&path, 10000).unwrap();
    assert_eq!(loaded.shape(), (12, 6));
    assert_eq!(loaded.column("target").unwrap().dtype(), &DataType::Int32);
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.xlsx");
    std::fs::write(&path, "not a table").unwrap();

    let err = load_dataset(&path, 10000).unwrap_err();
    assert!(err.to_string().contains("Unsupported file format"));
}

#[test]
fn test_column_names_from_schema() {
    let mut df = common::create_test_dataframe();
    let (_temp_dir, path) = common::create_temp_csv(&mut df);

    let names = get_column_names(&path, 100).unwrap();
    assert_eq!(
        names,
        vec![
            "sample_id",
            "target",
            "feature_good",
            "feature_corr",
            "feature_constant",
            "feature_noise"
        ]
    );
}

#[test]
fn test_loaded_csv_converts_to_matrix() {
    let mut df = common::create_test_dataframe();
    let (_temp_dir, path) = common::create_temp_csv(&mut df);

    let loaded = load_dataset(&path, 10000).unwrap();
    let (matrix, labels) = matrix_from_dataframe(&loaded, "target", Some("sample_id")).unwrap();

    assert_eq!(matrix.n_samples(), 12);
    assert_eq!(matrix.n_features(), 4);
    assert_eq!(matrix.sample_ids()[0], "m01");
    assert_eq!(labels.class_counts(), vec![6, 6]);
    assert_eq!(matrix.column_by_name("feature_constant").unwrap(), &[5.0; 12]);
}

#[test]
fn test_duplicate_sample_ids_rejected() {
    let df = df! {
        "id" => ["a", "a", "b"],
        "x" => [1.0f64, 2.0, 3.0],
        "y" => [0i32, 1, 0],
    }
    .unwrap();
    assert!(matches!(
        matrix_from_dataframe(&df, "y", Some("id")),
        Err(SelectionError::InvalidInput(_))
    ));
}

#[test]
fn test_string_labels_encoded_sorted() {
    let df = df! {
        "x" => [1.0f64, 2.0, 3.0, 4.0],
        "activity" => ["inhibitor", "activator", "inhibitor", "none"],
    }
    .unwrap();
    let (_, labels) = matrix_from_dataframe(&df, "activity", None).unwrap();
    assert_eq!(
        labels.classes(),
        &["activator".to_string(), "inhibitor".to_string(), "none".to_string()]
    );
    assert_eq!(labels.codes(), &[1, 0, 1, 2]);
}

#[test]
fn test_header_only_frame_rejected() {
    let df = df! {
        "x" => Vec::<f64>::new(),
        "y" => Vec::<i32>::new(),
    }
    .unwrap();
    assert!(matches!(
        matrix_from_dataframe(&df, "y", None),
        Err(SelectionError::InvalidInput(_))
    ));
}
