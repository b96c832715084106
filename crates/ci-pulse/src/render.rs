//! Turning a report into status-bar text

use anyhow::{Context, Result};
use ci_pulse_core::StatusReport;
use std::fmt::Write;

/// Output layout selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// xbar/BitBar plugin text
    Bitbar,
    /// The report as pretty-printed JSON
    Json,
}

pub fn render(report: &StatusReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Bitbar => Ok(render_bitbar(report)),
        OutputFormat::Json => {
            let mut out =
                serde_json::to_string_pretty(report).context("Failed to serialize report")?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Menu bar glyph, then a dropdown with one clickable line per project
fn render_bitbar(report: &StatusReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.aggregate().glyph());
    out.push_str("---\n");
    for entry in report.entries() {
        let _ = writeln!(
            out,
            "{} {} ({}) | href={}",
            entry.glyph, entry.name, entry.server_name, entry.url
        );
    }
    out.push_str("---\n");
    out.push_str("Refresh | refresh=true\n");
    out
}
