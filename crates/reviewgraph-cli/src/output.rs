//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reviewgraph_extractor::{RunSummary, StatusReport};
use std::path::Path;
use std::time::Duration;

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the summary of an extraction run.
    pub fn run_summary(&self, summary: &RunSummary, output: &Path) -> Result<String> {
        if self.format == CliFormat::Json {
            return Ok(serde_json::to_string_pretty(summary)?);
        }

        let mut lines = vec![format!("Output: {}", output.display())];
        lines.push(format!(
            "Reviews: {} total, {} already done, {} in other shards",
            summary.total, summary.skipped_completed, summary.skipped_other_shard
        ));
        lines.push(format!(
            "This run: {} attempted, {} triple(s) written",
            summary.attempted, summary.triples_written
        ));
        lines.push(self.success(&format!("{} review(s) extracted", summary.succeeded)));
        if summary.exhausted > 0 {
            lines.push(self.warning(&format!(
                "{} review(s) abandoned; rerun the same command to retry them",
                summary.exhausted
            )));
        }
        Ok(lines.join("\n"))
    }

    /// Format a progress report.
    pub fn status(&self, report: &StatusReport, output: &Path) -> Result<String> {
        if self.format == CliFormat::Json {
            return Ok(serde_json::to_string_pretty(report)?);
        }

        let mut lines = vec![
            format!("Output: {}", output.display()),
            format!("Total:     {}", report.total),
            format!("Completed: {}", report.completed),
            format!("Remaining: {}", report.remaining),
            format!("Triples:   {}", report.triples),
        ];
        if report.unparsable_lines > 0 {
            lines.push(self.warning(&format!(
                "{} unparsable line(s) in output",
                report.unparsable_lines
            )));
        }
        if report.remaining == 0 {
            lines.push(self.success("All reviews processed"));
        }
        Ok(lines.join("\n"))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Progress bar for an extraction run, drawn on stderr.
pub fn progress_bar(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} reviews ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> "),
    );
    pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
