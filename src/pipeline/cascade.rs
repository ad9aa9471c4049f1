//! Cascade orchestration
//!
//! Runs the configured strategies one after another, each narrowing the
//! features the previous stage kept, and assembles the [`SelectionResult`].

use super::config::{PipelineConfig, SelectionConfig};
use super::error::{Result, SelectionError};
use super::matrix::{FeatureMatrix, LabelVector};
use super::redundancy::find_redundant_features;
use super::result::{SelectionLog, SelectionResult, StageDetails};
use super::selectors::SelectionStrategy;
use super::variance::low_variance_features;

/// Run the selection cascade described by `config`.
///
/// The configuration is resolved before the data is looked at, so an
/// invalid configuration fails with `InvalidConfig` even when the labels are
/// misaligned.
pub fn select_features(
    matrix: &FeatureMatrix,
    labels: &LabelVector,
    config: &SelectionConfig,
) -> Result<SelectionResult> {
    let strategies = config.resolve()?;
    labels.ensure_aligned(matrix)?;

    if matrix.n_features() == 0 {
        return Err(SelectionError::invalid_input(
            "Feature selection needs at least one feature",
        ));
    }

    let mut log = SelectionLog::new(matrix);
    run_cascade(&strategies, matrix, labels, &mut log)?;
    finish(log, config.allow_empty)
}

/// Redundancy pruning, variance filtering and the selection cascade in one
/// run. The stage map lists `redundancy` and `variance` ahead of the
/// cascade methods when those filters are enabled.
pub fn run_pipeline(
    matrix: &FeatureMatrix,
    labels: &LabelVector,
    config: &PipelineConfig,
) -> Result<SelectionResult> {
    config.validate_filters()?;
    let strategies = config.selection.resolve()?;
    labels.ensure_aligned(matrix)?;

    if matrix.n_features() == 0 {
        return Err(SelectionError::invalid_input(
            "Feature selection needs at least one feature",
        ));
    }

    let mut log = SelectionLog::new(matrix);
    let mut current = matrix.clone();

    if let Some(threshold) = config.redundancy_threshold {
        if current.n_features() >= 2 {
            let report = find_redundant_features(&current, threshold)?;
            log::debug!(
                "redundancy: dropped {} features in {} groups",
                report.dropped.len(),
                report.groups.len()
            );
            log.record("redundancy", &report.kept, StageDetails::default());
            current = current.select_features(&report.kept)?;
        } else {
            log::debug!("redundancy: skipped, fewer than 2 features");
        }
    }

    if let Some(min_variance) = config.min_variance {
        let low = low_variance_features(&current, min_variance)?;
        log::debug!("variance: dropped {} features below {:e}", low.len(), min_variance);
        let kept: Vec<String> = current
            .feature_names()
            .iter()
            .filter(|name| !low.iter().any(|(dropped, _)| dropped == *name))
            .cloned()
            .collect();
        log.record("variance", &kept, StageDetails::default());
        current = current.select_features(&kept)?;
    }

    if current.n_features() > 0 {
        run_cascade(&strategies, &current, labels, &mut log)?;
    } else {
        log::debug!("no features left after filtering; cascade skipped");
    }

    finish(log, config.selection.allow_empty)
}

fn run_cascade(
    strategies: &[Box<dyn SelectionStrategy>],
    matrix: &FeatureMatrix,
    labels: &LabelVector,
    log: &mut SelectionLog,
) -> Result<()> {
    let mut current = matrix.clone();

    for strategy in strategies {
        if current.n_features() == 0 {
            log::debug!("{}: skipped, no features left", strategy.name());
            break;
        }

        let outcome = strategy.fit(&current, labels)?;
        let kept: Vec<String> = outcome
            .selected
            .iter()
            .map(|&i| current.feature_names()[i].clone())
            .collect();

        log::debug!(
            "{}: kept {} of {} features",
            strategy.name(),
            kept.len(),
            current.n_features()
        );
        if outcome.budget_exhausted {
            log::debug!(
                "{}: iteration budget exhausted after {} iterations",
                strategy.name(),
                outcome.iterations
            );
        }

        log.record(strategy.name(), &kept, outcome.details());
        current = current.select_columns(&outcome.selected);
    }

    Ok(())
}

fn finish(log: SelectionLog, allow_empty: bool) -> Result<SelectionResult> {
    let result = log.finish();
    if result.is_empty() && !allow_empty {
        let stage = result
            .trace()
            .last()
            .map(|r| r.stage.clone())
            .unwrap_or_else(|| "selection".to_string());
        return Err(SelectionError::convergence(format!(
            "No features retained after stage '{}'; set allow_empty to accept an empty selection",
            stage
        )));
    }
    Ok(result)
}
