//! Terminal styling utilities

use std::path::Path;
use std::time::Duration;

use console::{style, Emoji};

use crate::pipeline::PipelineConfig;

pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static LINK: Emoji<'_, '_> = Emoji("🔗 ", "");
pub static FUNNEL: Emoji<'_, '_> = Emoji("🔍 ", "");

const BOX_WIDTH: usize = 56;

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("featsel").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "    {}",
        style("Redundancy pruning, variance filtering and a selection cascade").dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

fn box_row(label: &str, value: &str) {
    let text = format!("{}{}", label, value);
    let pad = (BOX_WIDTH - 4).saturating_sub(console::measure_text_width(&text));
    println!("    │  {}{}│", text, " ".repeat(pad));
}

/// Print configuration card
pub fn print_config(input: &Path, label: &str, output: &Path, config: &PipelineConfig) {
    let line = "─".repeat(BOX_WIDTH - 2);

    println!("    ┌{}┐", line);
    box_row(&style("⚙️  Configuration").cyan().bold().to_string(), "");
    println!("    ├{}┤", line);
    box_row(&format!("{}Input:  ", FOLDER), &truncate_path(input, 38));
    box_row(&format!("{}Label:  ", TARGET), &truncate_string(label, 38));
    box_row(&format!("{}Output: ", SAVE), &truncate_path(output, 38));
    println!("    ├{}┤", line);
    box_row(
        &format!("{}Redundancy threshold:  ", LINK),
        &style(
            config
                .redundancy_threshold
                .map(|t| format!("{:.2}", t))
                .unwrap_or_else(|| "off".to_string()),
        )
            .yellow()
            .to_string(),
    );
    box_row(
        &format!("{}Minimum variance:      ", CHART),
        &style(
            config
                .min_variance
                .map(|v| format!("{:e}", v))
                .unwrap_or_else(|| "off".to_string()),
        )
            .yellow()
            .to_string(),
    );
    box_row(
        &format!("{}Methods: ", FUNNEL),
        &style(truncate_string(&config.selection.methods.join(" → "), 36))
            .yellow()
            .to_string(),
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print how long a step took
pub fn print_step_time(elapsed: Duration) {
    println!(
        "    {}",
        style(format!("⏱  {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Feature selection complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    match detail {
        Some(info) => println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        ),
        None => println!("      Found {} {}", style(count).yellow().bold(), description),
    }
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    truncate_string(&path.display().to_string(), max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
