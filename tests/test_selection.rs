//! Tests for the selection cascade

use featsel::pipeline::{select_features, LabelVector, SelectionConfig, SelectionError};

#[path = "common/mod.rs"]
mod common;

fn config(methods: &[&str]) -> SelectionConfig {
    SelectionConfig {
        methods: methods.iter().map(|m| m.to_string()).collect(),
        ..Default::default()
    }
}

#[test]
fn test_univariate_keeps_exactly_k() {
    let (m, labels) = common::create_classification_data(60, 8);
    let result = select_features(
        &m,
        &labels,
        &SelectionConfig {
            k: Some(3),
            ..config(&["univariate"])
        },
    )
    .unwrap();

    assert_eq!(result.len(), 3);
    assert!(result.contains("signal"));
    assert_eq!(
        result.stages_for("signal").unwrap(),
        &["univariate".to_string()]
    );
}

#[test]
fn test_univariate_is_deterministic() {
    let (m, labels) = common::create_classification_data(60, 8);
    for scoring in ["f-classif", "chi2", "mutual_info"] {
        let cfg = SelectionConfig {
            k: Some(4),
            scoring_function: scoring.to_string(),
            ..config(&["univariate"])
        };
        let first = select_features(&m, &labels, &cfg).unwrap();
        let second = select_features(&m, &labels, &cfg).unwrap();
        assert_eq!(first, second, "scoring {} not deterministic", scoring);
    }
}

#[test]
fn test_k_larger_than_feature_count_keeps_all() {
    let (m, labels) = common::create_classification_data(30, 2);
    let result = select_features(
        &m,
        &labels,
        &SelectionConfig {
            k: Some(50),
            ..config(&["univariate"])
        },
    )
    .unwrap();
    assert_eq!(result.features(), m.feature_names());
}

#[test]
fn test_percentile_rounds_up() {
    let (m, labels) = common::create_classification_data(40, 9);
    let result = select_features(
        &m,
        &labels,
        &SelectionConfig {
            percentile: Some(15.0),
            ..config(&["univariate"])
        },
    )
    .unwrap();
    // 15% of 10 features is 1.5
    assert_eq!(result.len(), 2);
}

#[test]
fn test_unknown_method_rejected() {
    let (m, labels) = common::create_classification_data(20, 2);
    assert!(matches!(
        select_features(&m, &labels, &config(&["univariate", "genetic"])),
        Err(SelectionError::InvalidConfig(_))
    ));
}

#[test]
fn test_label_length_mismatch_rejected() {
    let (m, _) = common::create_classification_data(20, 2);
    let labels = LabelVector::from_integers(&[0, 1, 0]);
    assert!(matches!(
        select_features(&m, &labels, &config(&["univariate"])),
        Err(SelectionError::InvalidInput(_))
    ));
}

#[test]
fn test_chi_square_rejects_negative_features() {
    let (m, labels) = common::create_classification_data(20, 1);
    let shifted = featsel::pipeline::FeatureMatrix::from_columns(
        m.feature_names().to_vec(),
        m.columns()
            .iter()
            .map(|c| c.iter().map(|v| v - 10.0).collect())
            .collect(),
    )
    .unwrap();
    let cfg = SelectionConfig {
        scoring_function: "chi-square".to_string(),
        ..config(&["univariate"])
    };
    assert!(matches!(
        select_features(&shifted, &labels, &cfg),
        Err(SelectionError::InvalidInput(_))
    ));
}

#[test]
fn test_recursive_elimination_keeps_dominant_feature() {
    let (m, labels) = common::create_classification_data(60, 4);
    let result = select_features(&m, &labels, &config(&["rfecv"])).unwrap();

    assert!(result.contains("signal"));
    let record = &result.trace()[0];
    assert_eq!(record.stage, "recursive-elimination-cv");
    assert_eq!(record.best_cv_score, Some(1.0));
    assert!(!record.budget_exhausted);
}

#[test]
fn test_budget_exhaustion_is_reported_not_fatal() {
    let (m, labels) = common::create_classification_data(60, 4);
    let result = select_features(
        &m,
        &labels,
        &SelectionConfig {
            max_iterations: 1,
            ..config(&["rfecv"])
        },
    )
    .unwrap();

    let record = &result.trace()[0];
    assert!(record.budget_exhausted);
    assert_eq!(record.iterations, 1);
    // only the full set was ever evaluated
    assert_eq!(result.len(), m.n_features());
}

#[test]
fn test_model_based_methods_keep_signal() {
    let (m, labels) = common::create_classification_data(60, 4);
    for method in ["model-based-l1", "model-based-tree"] {
        let result = select_features(&m, &labels, &config(&[method])).unwrap();
        assert!(result.contains("signal"), "{} dropped the signal", method);
        assert_eq!(result.trace()[0].stage, method);
    }
}

#[test]
fn test_sequential_forward_stops_when_gain_vanishes() {
    let (m, labels) = common::create_classification_data(60, 4);
    let result = select_features(&m, &labels, &config(&["sequential-forward"])).unwrap();
    assert_eq!(result.features(), &["signal".to_string()]);
}

#[test]
fn test_sequential_backward_fixed_size() {
    let (m, labels) = common::create_classification_data(60, 3);
    let result = select_features(
        &m,
        &labels,
        &SelectionConfig {
            n_features_to_select: Some(1),
            ..config(&["sequential-backward"])
        },
    )
    .unwrap();
    assert_eq!(result.features(), &["signal".to_string()]);
}

#[test]
fn test_cascade_stages_narrow_in_order() {
    let (m, labels) = common::create_classification_data(60, 6);
    let result = select_features(
        &m,
        &labels,
        &SelectionConfig {
            k: Some(3),
            ..config(&["univariate", "sequential-forward"])
        },
    )
    .unwrap();

    let trace = result.trace();
    assert_eq!(trace.len(), 2);
    assert_eq!(trace[0].features_in, 7);
    assert_eq!(trace[0].features_out, 3);
    assert_eq!(trace[1].features_in, 3);
    assert_eq!(result.features(), &["signal".to_string()]);
    assert_eq!(
        result.stages_for("signal").unwrap(),
        &["univariate".to_string(), "sequential-forward".to_string()]
    );
}

#[test]
fn test_empty_selection_fails_unless_allowed() {
    let (m, labels) = common::create_classification_data(40, 3);
    let strict = SelectionConfig {
        l1_alpha: 100.0,
        ..config(&["model-based-l1"])
    };
    assert!(matches!(
        select_features(&m, &labels, &strict),
        Err(SelectionError::Convergence(_))
    ));

    let lenient = SelectionConfig {
        allow_empty: true,
        ..strict
    };
    let result = select_features(&m, &labels, &lenient).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.trace()[0].features_out, 0);
}

#[test]
fn test_too_many_folds_rejected() {
    let (m, labels) = common::create_classification_data(6, 2);
    let cfg = SelectionConfig {
        cross_validation_folds: 10,
        ..config(&["rfecv"])
    };
    assert!(matches!(
        select_features(&m, &labels, &cfg),
        Err(SelectionError::InvalidInput(_))
    ));
}

#[test]
fn test_support_mask_aligns_with_input() {
    let (m, labels) = common::create_classification_data(40, 3);
    let result = select_features(
        &m,
        &labels,
        &SelectionConfig {
            k: Some(1),
            ..config(&["univariate"])
        },
    )
    .unwrap();
    assert_eq!(
        result.support_mask(m.feature_names()),
        vec![false, false, false, true]
    );
    assert_eq!(result.to_lines().trim_end(), "signal");
}

#[test]
fn test_zero_timeout_rejected() {
    let (m, labels) = common::create_classification_data(20, 2);
    for method in ["rfecv", "sequential-forward", "sequential-backward"] {
        let cfg = SelectionConfig {
            timeout_secs: Some(0),
            ..config(&[method])
        };
        assert!(matches!(
            select_features(&m, &labels, &cfg),
            Err(SelectionError::InvalidConfig(_))
        ));
    }
}
