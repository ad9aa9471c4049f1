//! Feature matrix and label vector
//!
//! The in-memory table the selection core operates on. Values are stored
//! column-major so per-feature statistics and column subsetting are cheap.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::error::{Result, SelectionError};
use super::stats::{mean, variance};

/// Numeric feature table: rows are samples, columns are named features.
///
/// Invariants enforced at construction:
/// - there is at least one sample
/// - sample identifiers are unique, feature names are unique
/// - every column has one value per sample
/// - every value is finite (no missing values)
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    sample_ids: Vec<String>,
    feature_names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Build a matrix from column-major data.
    pub fn new(
        sample_ids: Vec<String>,
        feature_names: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if feature_names.len() != columns.len() {
            return Err(SelectionError::invalid_input(format!(
                "{} feature names given for {} columns",
                feature_names.len(),
                columns.len()
            )));
        }

        if sample_ids.is_empty() {
            return Err(SelectionError::invalid_input("Matrix has no samples"));
        }

        ensure_unique(&sample_ids, "sample identifier")?;
        ensure_unique(&feature_names, "feature name")?;

        let n_samples = sample_ids.len();
        for (name, values) in feature_names.iter().zip(columns.iter()) {
            if values.len() != n_samples {
                return Err(SelectionError::invalid_input(format!(
                    "Feature '{}' has {} values but there are {} samples",
                    name,
                    values.len(),
                    n_samples
                )));
            }
            if let Some(row) = values.iter().position(|v| !v.is_finite()) {
                return Err(SelectionError::invalid_input(format!(
                    "Feature '{}' has a missing or non-finite value at sample '{}'",
                    name, sample_ids[row]
                )));
            }
        }

        Ok(Self {
            sample_ids,
            feature_names,
            columns,
        })
    }

    /// Build a matrix with row indices ("0", "1", ...) as sample identifiers.
    pub fn from_columns(feature_names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        let n_samples = columns.first().map(|c| c.len()).unwrap_or(0);
        let sample_ids = (0..n_samples).map(|i| i.to_string()).collect();
        Self::new(sample_ids, feature_names, columns)
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Values of the feature at position `index`.
    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    pub fn column_by_name(&self, name: &str) -> Option<&[f64]> {
        self.feature_index(name).map(|i| self.column(i))
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    /// Population variance of the feature at position `index`.
    pub fn variance(&self, index: usize) -> f64 {
        variance(&self.columns[index])
    }

    pub fn mean(&self, index: usize) -> f64 {
        mean(&self.columns[index])
    }

    /// Value at (`row`, `col`).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.columns[col][row]
    }

    /// Keep the listed feature positions, in the order given.
    pub fn select_columns(&self, indices: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            sample_ids: self.sample_ids.clone(),
            feature_names: indices
                .iter()
                .map(|&i| self.feature_names[i].clone())
                .collect(),
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
        }
    }

    /// Keep the named features, in the order given.
    pub fn select_features<S: AsRef<str>>(&self, names: &[S]) -> Result<FeatureMatrix> {
        let indices = names
            .iter()
            .map(|name| {
                self.feature_index(name.as_ref()).ok_or_else(|| {
                    SelectionError::invalid_input(format!(
                        "Feature '{}' not found in matrix",
                        name.as_ref()
                    ))
                })
            })
            .collect::<Result<Vec<usize>>>()?;
        Ok(self.select_columns(&indices))
    }

    /// Keep the listed sample rows, in the order given.
    pub fn select_rows(&self, rows: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            sample_ids: rows.iter().map(|&r| self.sample_ids[r].clone()).collect(),
            feature_names: self.feature_names.clone(),
            columns: self
                .columns
                .iter()
                .map(|col| rows.iter().map(|&r| col[r]).collect())
                .collect(),
        }
    }

    /// Rows and columns in one pass, avoiding an intermediate full-width copy.
    pub fn select_block(&self, rows: &[usize], cols: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            sample_ids: rows.iter().map(|&r| self.sample_ids[r].clone()).collect(),
            feature_names: cols.iter().map(|&c| self.feature_names[c].clone()).collect(),
            columns: cols
                .iter()
                .map(|&c| rows.iter().map(|&r| self.columns[c][r]).collect())
                .collect(),
        }
    }
}

fn ensure_unique(values: &[String], what: &str) -> Result<()> {
    let mut seen = HashSet::with_capacity(values.len());
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(SelectionError::invalid_input(format!(
                "Duplicate {} '{}'",
                what, value
            )));
        }
    }
    Ok(())
}

/// Class labels aligned by row with a [`FeatureMatrix`].
///
/// Labels are stored as class codes `0..n_classes`; `classes[code]` is the
/// original label text. Classes are sorted so codes are stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelVector {
    codes: Vec<usize>,
    classes: Vec<String>,
}

impl LabelVector {
    /// Encode textual labels into class codes.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut classes: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();

        let lookup: BTreeMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(code, class)| (class.as_str(), code))
            .collect();

        let codes = labels.iter().map(|l| lookup[l.as_ref()]).collect();

        Self { codes, classes }
    }

    /// Binary or small-integer labels, e.g. `0/1` modulator flags.
    pub fn from_integers(labels: &[i64]) -> Self {
        let mut distinct: Vec<i64> = labels.to_vec();
        distinct.sort_unstable();
        distinct.dedup();

        let codes = labels
            .iter()
            .map(|l| distinct.binary_search(l).unwrap_or_default())
            .collect();
        let classes = distinct.iter().map(|c| c.to_string()).collect();

        Self { codes, classes }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Number of samples per class code.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &code in &self.codes {
            counts[code] += 1;
        }
        counts
    }

    /// Labels for the listed rows. The class list is kept whole so codes
    /// keep their meaning inside cross-validation folds.
    pub fn select_rows(&self, rows: &[usize]) -> LabelVector {
        LabelVector {
            codes: rows.iter().map(|&r| self.codes[r]).collect(),
            classes: self.classes.clone(),
        }
    }

    /// Fail unless there is exactly one label per matrix row.
    pub fn ensure_aligned(&self, matrix: &FeatureMatrix) -> Result<()> {
        if self.len() != matrix.n_samples() {
            return Err(SelectionError::invalid_input(format!(
                "Label vector has {} entries but the feature matrix has {} rows",
                self.len(),
                matrix.n_samples()
            )));
        }
        Ok(())
    }
}
