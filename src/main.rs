//! featsel: feature selection CLI tool
//!
//! Loads a labeled dataset, runs redundancy pruning, variance filtering and
//! the selection cascade, and writes the reduced dataset with a report.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use featsel::cli::Cli;
use featsel::pipeline::{
    get_column_names, load_dataset, matrix_from_dataframe, run_pipeline, save_dataset,
    select_output_columns,
};
use featsel::report::{export_feature_list, export_selection, ExportParams, SelectionSummary};
use featsel::utils::{
    create_spinner, finish_with_error, finish_with_success, finish_with_warning, print_banner,
    print_completion, print_config, print_count, print_info, print_step_header, print_step_time,
    print_success,
};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = cli.pipeline_config()?;
    let output_path = cli.output_path();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&cli.input, &cli.target, &output_path, &config);

    // Fail on a wrong label column before reading any rows
    let columns = get_column_names(&cli.input, cli.infer_schema_length)?;
    if !columns.contains(&cli.target) {
        anyhow::bail!(
            "Label column '{}' not found in dataset. Available columns: {:?}",
            cli.target,
            columns
        );
    }

    // Step 1: Load dataset
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading dataset...");
    let df = load_dataset(&cli.input, cli.infer_schema_length)?;
    let (matrix, labels) = matrix_from_dataframe(&df, &cli.target, cli.id_column.as_deref())?;
    finish_with_success(&spinner, "Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Samples: {}", matrix.n_samples());
    println!("      Features: {}", matrix.n_features());
    println!("      Classes: {}", labels.classes().join(", "));
    let load_elapsed = step_start.elapsed();
    print_step_time(load_elapsed);

    // Step 2: Selection
    print_step_header(2, "Feature Selection");
    let step_start = Instant::now();
    let spinner = create_spinner("Running redundancy pruning, variance filter and cascade...");
    let result = match run_pipeline(&matrix, &labels, &config) {
        Ok(result) => result,
        Err(e) => {
            finish_with_error(&spinner, "Selection failed");
            return Err(e.into());
        }
    };
    if result.trace().iter().any(|r| r.budget_exhausted) {
        finish_with_warning(&spinner, "Selection complete (iteration budget exhausted)");
    } else {
        finish_with_success(&spinner, "Selection complete");
    }

    for record in result.trace() {
        if record.dropped.is_empty() {
            print_info(&format!("{}: nothing dropped", record.stage));
        } else {
            print_count(
                &format!("feature(s) dropped by {}", record.stage),
                record.dropped.len(),
                record
                    .best_cv_score
                    .map(|s| format!("(best cv {:.4})", s))
                    .as_deref(),
            );
        }
    }
    let selection_elapsed = step_start.elapsed();
    print_step_time(selection_elapsed);

    // Step 3: Save output
    print_step_header(3, "Save Results");
    let step_start = Instant::now();
    let spinner = create_spinner("Writing output files...");

    let mut reduced = select_output_columns(
        &df,
        cli.id_column.as_deref(),
        &cli.target,
        result.features(),
    )?;
    save_dataset(&mut reduced, &output_path)?;

    let features_path = cli.features_path();
    export_feature_list(&result, &features_path)?;

    let json_path = cli.selection_json_path();
    let input_file = cli.input.display().to_string();
    export_selection(
        &result,
        matrix.feature_names(),
        &json_path,
        &ExportParams {
            input_file: &input_file,
            label_column: &cli.target,
            id_column: cli.id_column.as_deref(),
            n_samples: matrix.n_samples(),
            config: &config,
        },
    )?;
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));
    print_success(&format!("Feature list: {}", features_path.display()));
    print_success(&format!("Selection report: {}", json_path.display()));
    let save_elapsed = step_start.elapsed();
    print_step_time(save_elapsed);

    let mut summary = SelectionSummary::new(matrix.n_features(), &result);
    summary.set_load_time(load_elapsed);
    summary.set_selection_time(selection_elapsed);
    summary.set_save_time(save_elapsed);
    summary.display();

    print_completion();

    Ok(())
}
