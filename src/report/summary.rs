//! Selection summary report

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{SelectionResult, StageRecord};

/// Summary of a selection run for terminal display
#[derive(Debug, Default)]
pub struct SelectionSummary {
    pub initial_features: usize,
    pub final_features: usize,
    pub stages: Vec<StageRecord>,
    pub load_time: Option<Duration>,
    pub selection_time: Option<Duration>,
    pub save_time: Option<Duration>,
}

impl SelectionSummary {
    pub fn new(initial_features: usize, result: &SelectionResult) -> Self {
        Self {
            initial_features,
            final_features: result.len(),
            stages: result.trace().to_vec(),
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = Some(elapsed);
    }

    pub fn set_selection_time(&mut self, elapsed: Duration) {
        self.selection_time = Some(elapsed);
    }

    pub fn set_save_time(&mut self, elapsed: Duration) {
        self.save_time = Some(elapsed);
    }

    /// Fraction of the initial features removed, as a percentage.
    pub fn reduction_pct(&self) -> f64 {
        if self.initial_features > 0 {
            (self.initial_features - self.final_features.min(self.initial_features)) as f64
                / self.initial_features as f64
                * 100.0
        } else {
            0.0
        }
    }

    /// Per-stage table: features in, out, dropped and the best CV score.
    pub fn stage_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("In").add_attribute(Attribute::Bold),
            Cell::new("Out").add_attribute(Attribute::Bold),
            Cell::new("Dropped").add_attribute(Attribute::Bold),
            Cell::new("Best CV").add_attribute(Attribute::Bold),
        ]);

        for record in &self.stages {
            let dropped = record.dropped.len();
            let mut stage_cell = Cell::new(&record.stage);
            if record.budget_exhausted {
                stage_cell = Cell::new(format!("{} (budget)", record.stage)).fg(Color::Yellow);
            }
            table.add_row(vec![
                stage_cell,
                Cell::new(record.features_in),
                Cell::new(record.features_out),
                Cell::new(dropped).fg(if dropped == 0 { Color::White } else { Color::Red }),
                Cell::new(
                    record
                        .best_cv_score
                        .map(|s| format!("{:.4}", s))
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
        }

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("SELECTION SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.stage_table().to_string().lines() {
            println!("    {}", line);
        }

        let reduction_pct = self.reduction_pct();
        let color = if reduction_pct > 30.0 {
            Color::Green
        } else if reduction_pct > 10.0 {
            Color::Yellow
        } else {
            Color::Cyan
        };

        let mut totals = Table::new();
        totals.load_preset(UTF8_FULL_CONDENSED);
        totals.add_row(vec![
            Cell::new("📁 Initial Features"),
            Cell::new(self.initial_features),
        ]);
        totals.add_row(vec![
            Cell::new("✅ Selected Features"),
            Cell::new(self.final_features)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        totals.add_row(vec![
            Cell::new("📉 Reduction"),
            Cell::new(format!("{:.1}%", reduction_pct))
                .fg(color)
                .add_attribute(Attribute::Bold),
        ]);
        if let Some(t) = self.selection_time {
            totals.add_row(vec![
                Cell::new("⏱  Selection Time"),
                Cell::new(format!("{:.2}s", t.as_secs_f64())),
            ]);
        }

        println!();
        for line in totals.to_string().lines() {
            println!("    {}", line);
        }

        let dropping: Vec<&StageRecord> = self.stages.iter().filter(|r| !r.dropped.is_empty()).collect();
        if !dropping.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("📝").cyan(),
                style("DROPPED FEATURES").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());

            for record in dropping {
                println!();
                println!(
                    "      {} {}:",
                    style(&record.stage).yellow(),
                    style(format!("({})", record.dropped.len())).dim()
                );
                for feature in &record.dropped {
                    println!("        {} {}", style("•").dim(), feature);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(stage: &str, features_in: usize, dropped: &[&str]) -> StageRecord {
        StageRecord {
            stage: stage.to_string(),
            features_in,
            features_out: features_in - dropped.len(),
            dropped: dropped.iter().map(|s| s.to_string()).collect(),
            best_cv_score: None,
            iterations: 0,
            budget_exhausted: false,
        }
    }

    #[test]
    fn test_reduction_pct() {
        let summary = SelectionSummary {
            initial_features: 8,
            final_features: 2,
            ..Default::default()
        };
        assert!((summary.reduction_pct() - 75.0).abs() < 1e-12);
        assert_eq!(SelectionSummary::default().reduction_pct(), 0.0);
    }

    #[test]
    fn test_stage_table_rows() {
        let summary = SelectionSummary {
            initial_features: 4,
            final_features: 1,
            stages: vec![record("redundancy", 4, &["b"]), record("univariate", 3, &["c", "d"])],
            ..Default::default()
        };
        let rendered = summary.stage_table().to_string();
        assert!(rendered.contains("redundancy"));
        assert!(rendered.contains("univariate"));
        assert!(rendered.contains("Best CV"));
    }
}
