//! JSON export of a selection run

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{PipelineConfig, SelectionResult, StageRecord};

/// Metadata about the selection run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub featsel_version: String,
    pub input_file: String,
    pub label_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_column: Option<String>,
    pub n_samples: usize,
    /// Configuration the run used, after CLI overrides
    pub config: PipelineConfig,
}

/// Complete export of a selection run
#[derive(Serialize)]
pub struct SelectionExport<'a> {
    pub metadata: RunMetadata,
    /// Selected feature names in original column order
    pub selected_features: &'a [String],
    /// Features of the input, in column order
    pub input_features: &'a [String],
    /// One flag per input feature: true when selected
    pub support_mask: Vec<bool>,
    /// Stages that kept each selected feature
    pub stages: &'a BTreeMap<String, Vec<String>>,
    pub trace: &'a [StageRecord],
}

/// Parameters for the export metadata
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub label_column: &'a str,
    pub id_column: Option<&'a str>,
    pub n_samples: usize,
    pub config: &'a PipelineConfig,
}

/// Build the export structure for a finished run.
pub fn build_export<'a>(
    result: &'a SelectionResult,
    input_features: &'a [String],
    params: &ExportParams,
) -> SelectionExport<'a> {
    SelectionExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            featsel_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            label_column: params.label_column.to_string(),
            id_column: params.id_column.map(|s| s.to_string()),
            n_samples: params.n_samples,
            config: params.config.clone(),
        },
        selected_features: result.features(),
        input_features,
        support_mask: result.support_mask(input_features),
        stages: result.stage_map(),
        trace: result.trace(),
    }
}

/// Export a selection run to a JSON file
pub fn export_selection(
    result: &SelectionResult,
    input_features: &[String],
    output_path: &Path,
    params: &ExportParams,
) -> Result<()> {
    let export = build_export(result, input_features, params);

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize selection result to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write selection result to {}", output_path.display()))?;

    Ok(())
}

/// Write the selected feature names, one per line
pub fn export_feature_list(result: &SelectionResult, output_path: &Path) -> Result<()> {
    std::fs::write(output_path, result.to_lines())
        .with_context(|| format!("Failed to write feature list to {}", output_path.display()))
}
