//! Selection results
//!
//! A [`SelectionResult`] is produced once per run and never modified. It
//! lists the retained features in original column order, which stages kept
//! each of them, and a per-stage trace.

use std::collections::BTreeMap;

use serde::Serialize;

use super::matrix::FeatureMatrix;

/// What one stage of the run did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub stage: String,
    pub features_in: usize,
    pub features_out: usize,
    /// Features this stage removed, in column order
    pub dropped: Vec<String>,
    /// Best mean cross-validation score reached, for wrapper methods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_cv_score: Option<f64>,
    /// Evaluation rounds used by iterative methods
    pub iterations: usize,
    /// The search stopped because its iteration budget ran out
    pub budget_exhausted: bool,
}

/// Final retained features plus the record of which stages kept them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResult {
    features: Vec<String>,
    stages: BTreeMap<String, Vec<String>>,
    trace: Vec<StageRecord>,
}

impl SelectionResult {
    /// Retained feature names, in original column order.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Stages that kept `feature`, in execution order.
    pub fn stages_for(&self, feature: &str) -> Option<&[String]> {
        self.stages.get(feature).map(|s| s.as_slice())
    }

    /// Feature name -> stages that kept it.
    pub fn stage_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.stages
    }

    pub fn trace(&self) -> &[StageRecord] {
        &self.trace
    }

    /// One retained feature name per line.
    pub fn to_lines(&self) -> String {
        let mut out = String::new();
        for feature in &self.features {
            out.push_str(feature);
            out.push('\n');
        }
        out
    }

    /// Boolean mask over `original_features`, true where the feature was
    /// retained. This is the form a downstream predictor consumes to pick
    /// its input columns.
    pub fn support_mask<S: AsRef<str>>(&self, original_features: &[S]) -> Vec<bool> {
        original_features
            .iter()
            .map(|f| self.contains(f.as_ref()))
            .collect()
    }
}

/// Accumulates stage records while a run is in progress
#[derive(Debug, Clone)]
pub(crate) struct SelectionLog {
    current: Vec<String>,
    trace: Vec<StageRecord>,
}

/// Extra per-stage details reported by wrapper methods
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StageDetails {
    pub best_cv_score: Option<f64>,
    pub iterations: usize,
    pub budget_exhausted: bool,
}

impl SelectionLog {
    pub fn new(matrix: &FeatureMatrix) -> Self {
        Self {
            current: matrix.feature_names().to_vec(),
            trace: Vec::new(),
        }
    }

    /// Record a stage that narrowed the current features to `kept`.
    pub fn record(&mut self, stage: &str, kept: &[String], details: StageDetails) {
        let dropped = self
            .current
            .iter()
            .filter(|f| !kept.contains(*f))
            .cloned()
            .collect();

        self.trace.push(StageRecord {
            stage: stage.to_string(),
            features_in: self.current.len(),
            features_out: kept.len(),
            dropped,
            best_cv_score: details.best_cv_score,
            iterations: details.iterations,
            budget_exhausted: details.budget_exhausted,
        });

        // keep the original order whatever order the stage reported
        self.current.retain(|f| kept.contains(f));
    }

    pub fn finish(self) -> SelectionResult {
        let stage_names: Vec<String> = self.trace.iter().map(|r| r.stage.clone()).collect();
        let stages = self
            .current
            .iter()
            .map(|f| (f.clone(), stage_names.clone()))
            .collect();

        SelectionResult {
            features: self.current,
            stages,
            trace: self.trace,
        }
    }
}
