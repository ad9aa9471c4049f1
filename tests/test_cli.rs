//! Tests for CLI argument parsing and configuration resolution

use clap::Parser;
use featsel::cli::Cli;
use featsel::pipeline::{PipelineConfig, DEFAULT_MIN_VARIANCE, DEFAULT_REDUNDANCY_THRESHOLD};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["featsel", "-i", "data.csv", "-t", "active"]);

    assert_eq!(cli.target, "active");
    assert!(cli.methods.is_empty());
    assert!(!cli.no_redundancy);
    assert!(!cli.allow_empty);
    assert_eq!(cli.infer_schema_length, 10000);

    let config = cli.pipeline_config().unwrap();
    assert_eq!(config, PipelineConfig::default());
    assert_eq!(config.redundancy_threshold, Some(DEFAULT_REDUNDANCY_THRESHOLD));
    assert_eq!(config.min_variance, Some(DEFAULT_MIN_VARIANCE));
}

#[test]
fn test_cli_output_path_derivation() {
    let cli = Cli::parse_from(["featsel", "-i", "/path/to/data.csv", "-t", "active"]);

    assert_eq!(cli.output_path(), PathBuf::from("/path/to/data_selected.csv"));
    assert_eq!(cli.features_path(), PathBuf::from("/path/to/data_features.txt"));
    assert_eq!(
        cli.selection_json_path(),
        PathBuf::from("/path/to/data_selection.json")
    );
}

#[test]
fn test_cli_explicit_output() {
    let cli = Cli::parse_from([
        "featsel", "-i", "data.csv", "-t", "active", "-o", "out/reduced.parquet",
    ]);
    assert_eq!(cli.output_path(), PathBuf::from("out/reduced.parquet"));
}

#[test]
fn test_cli_selection_flags() {
    let cli = Cli::parse_from([
        "featsel",
        "-i",
        "data.csv",
        "-t",
        "active",
        "-m",
        "model-based-tree,rfecv",
        "--folds",
        "3",
        "--no-stratified",
        "--estimator",
        "random-forest",
        "--n-estimators",
        "20",
        "--seed",
        "7",
        "--max-iterations",
        "50",
        "--timeout-secs",
        "30",
        "--correlation-threshold",
        "0.8",
        "--no-variance",
    ]);

    let config = cli.pipeline_config().unwrap();
    assert_eq!(config.redundancy_threshold, Some(0.8));
    assert_eq!(config.min_variance, None);

    let s = &config.selection;
    assert_eq!(s.methods, vec!["model-based-tree", "rfecv"]);
    assert_eq!(s.cross_validation_folds, 3);
    assert!(!s.stratified);
    assert_eq!(s.estimator, "random-forest");
    assert_eq!(s.n_estimators, 20);
    assert_eq!(s.seed, 7);
    assert_eq!(s.max_iterations, 50);
    assert_eq!(s.timeout_secs, Some(30));
    assert!(s.resolve().is_ok());
}

#[test]
fn test_cli_rejects_out_of_range_values() {
    for args in [
        vec!["featsel", "-i", "d.csv", "-t", "y", "--correlation-threshold", "1.5"],
        vec!["featsel", "-i", "d.csv", "-t", "y", "--correlation-threshold", "0"],
        vec!["featsel", "-i", "d.csv", "-t", "y", "--percentile", "0"],
        vec!["featsel", "-i", "d.csv", "-t", "y", "--min-variance", "-1"],
        vec!["featsel", "-i", "d.csv", "-t", "y", "-k", "3", "--percentile", "20"],
        vec!["featsel", "-i", "d.csv"],
    ] {
        assert!(Cli::try_parse_from(args.clone()).is_err(), "accepted {:?}", args);
    }
}

#[test]
fn test_flags_override_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("pipeline.json");
    std::fs::write(
        &config_path,
        r#"{
            "redundancy_threshold": 0.95,
            "min_variance": 0.001,
            "selection": { "methods": ["sequential-forward"], "k": 5, "seed": 3 }
        }"#,
    )
    .unwrap();

    let config_arg = config_path.to_string_lossy().to_string();
    let cli = Cli::parse_from([
        "featsel",
        "-i",
        "data.csv",
        "-t",
        "active",
        "--config",
        config_arg.as_str(),
        "--percentile",
        "25",
        "--no-redundancy",
    ]);
    let config = cli.pipeline_config().unwrap();

    assert_eq!(config.redundancy_threshold, None);
    assert_eq!(config.min_variance, Some(0.001));
    assert_eq!(config.selection.methods, vec!["sequential-forward"]);
    assert_eq!(config.selection.seed, 3);
    assert_eq!(config.selection.k, None);
    assert_eq!(config.selection.percentile, Some(25.0));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let cli = Cli::parse_from([
        "featsel", "-i", "data.csv", "-t", "active", "--config", "/nonexistent/pipeline.json",
    ]);
    assert!(cli.pipeline_config().is_err());
}
