//! Dataset loader for CSV and Parquet files
//!
//! Reading and writing go through polars; [`matrix_from_dataframe`] turns a
//! loaded frame into the validated matrix and labels the selector works on.

use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use polars::prelude::*;

use super::error::{Result, SelectionError};
use super::matrix::{FeatureMatrix, LabelVector};

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn scan_dataset(path: &Path, infer_schema_length: usize) -> AnyResult<LazyFrame> {
    // 0 means full scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let extension = file_extension(path);
    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    Ok(lf)
}

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> AnyResult<DataFrame> {
    scan_dataset(path, infer_schema_length)?
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))
}

/// Column names of a dataset, read from the schema without loading rows
pub fn get_column_names(path: &Path, infer_schema_length: usize) -> AnyResult<Vec<String>> {
    let schema = scan_dataset(path, infer_schema_length)?
        .collect_schema()
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;
    Ok(schema.iter_names().map(|s| s.to_string()).collect())
}

/// Save dataset to file (CSV or Parquet based on extension)
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> AnyResult<()> {
    let extension = file_extension(path);

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}

fn polars_input_error(column: &str, err: PolarsError) -> SelectionError {
    SelectionError::invalid_input(format!("Column '{}': {}", column, err))
}

fn column_as_strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let col = df.column(name).map_err(|e| polars_input_error(name, e))?;
    if col.null_count() > 0 {
        return Err(SelectionError::invalid_input(format!(
            "Column '{}' contains {} missing values",
            name,
            col.null_count()
        )));
    }

    let cast = col
        .cast(&DataType::String)
        .map_err(|e| polars_input_error(name, e))?;
    let values = cast
        .str()
        .map_err(|e| polars_input_error(name, e))?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();
    Ok(values)
}

fn labels_from_column(df: &DataFrame, name: &str) -> Result<LabelVector> {
    let col = df.column(name).map_err(|e| polars_input_error(name, e))?;
    if col.null_count() > 0 {
        return Err(SelectionError::invalid_input(format!(
            "Label column '{}' contains {} missing values",
            name,
            col.null_count()
        )));
    }

    if col.dtype().is_integer() {
        let cast = col
            .cast(&DataType::Int64)
            .map_err(|e| polars_input_error(name, e))?;
        let values: Vec<i64> = cast
            .i64()
            .map_err(|e| polars_input_error(name, e))?
            .into_iter()
            .flatten()
            .collect();
        return Ok(LabelVector::from_integers(&values));
    }

    let values = column_as_strings(df, name)?;
    Ok(LabelVector::from_labels(&values))
}

/// Split a frame into a feature matrix and class labels.
///
/// Every column except the label (and the optional sample-id column) becomes
/// a feature and must be numeric without missing values. Without an id
/// column, row positions serve as sample identifiers.
pub fn matrix_from_dataframe(
    df: &DataFrame,
    label_column: &str,
    id_column: Option<&str>,
) -> Result<(FeatureMatrix, LabelVector)> {
    let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();

    if !names.iter().any(|n| n == label_column) {
        return Err(SelectionError::invalid_input(format!(
            "Label column '{}' not found in dataset. Available columns: {:?}",
            label_column, names
        )));
    }
    if let Some(id) = id_column {
        if !names.iter().any(|n| n == id) {
            return Err(SelectionError::invalid_input(format!(
                "Id column '{}' not found in dataset",
                id
            )));
        }
        if id == label_column {
            return Err(SelectionError::invalid_input(
                "Id column and label column must differ",
            ));
        }
    }

    let labels = labels_from_column(df, label_column)?;
    let sample_ids = match id_column {
        Some(id) => column_as_strings(df, id)?,
        None => (0..df.height()).map(|i| i.to_string()).collect(),
    };

    let mut feature_names = Vec::new();
    let mut columns = Vec::new();
    for col in df.get_columns() {
        let name = col.name().as_str();
        if name == label_column || Some(name) == id_column {
            continue;
        }
        if !col.dtype().is_primitive_numeric() {
            return Err(SelectionError::invalid_input(format!(
                "Feature '{}' is not numeric (found {})",
                name,
                col.dtype()
            )));
        }
        if col.null_count() > 0 {
            return Err(SelectionError::invalid_input(format!(
                "Feature '{}' contains {} missing values",
                name,
                col.null_count()
            )));
        }

        let float_col = col
            .cast(&DataType::Float64)
            .map_err(|e| polars_input_error(name, e))?;
        let values: Vec<f64> = float_col
            .f64()
            .map_err(|e| polars_input_error(name, e))?
            .into_iter()
            .flatten()
            .collect();

        feature_names.push(name.to_string());
        columns.push(values);
    }

    let matrix = FeatureMatrix::new(sample_ids, feature_names, columns)?;
    labels.ensure_aligned(&matrix)?;
    Ok((matrix, labels))
}

/// Keep the id and label columns plus the selected features, in that order.
pub fn select_output_columns(
    df: &DataFrame,
    id_column: Option<&str>,
    label_column: &str,
    features: &[String],
) -> AnyResult<DataFrame> {
    let mut keep: Vec<String> = Vec::with_capacity(features.len() + 2);
    if let Some(id) = id_column {
        keep.push(id.to_string());
    }
    keep.push(label_column.to_string());
    keep.extend(features.iter().cloned());

    df.select(keep).context("Failed to select output columns")
}
