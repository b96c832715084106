//! ci-pulse - CI status aggregator for the menu bar

mod render;

use anyhow::{Context, Result};
use ci_pulse_core::config::{resolve_config, ConfigOverrides};
use ci_pulse_core::{logging, Coordinator};
use clap::Parser;
use render::{render, OutputFormat};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// ci-pulse - latest CI runs across GitHub and GitLab in one glyph
#[derive(Parser, Debug)]
#[command(name = "ci-pulse")]
#[command(about = "Latest CI runs across GitHub and GitLab in one glyph")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore runs last updated this many days ago or earlier
    #[arg(long, value_name = "DAYS")]
    days: Option<u32>,

    /// Output layout
    #[arg(long, value_enum, default_value = "bitbar")]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let overrides = ConfigOverrides {
        config_path: args.config.clone(),
        days_until_inactive: args.days,
    };
    let config = resolve_config(&overrides).context("Failed to resolve configuration")?;
    debug!(
        "Polling {} server(s), cutoff {} day(s)",
        config.servers().count(),
        config.days_until_inactive
    );

    let coordinator =
        Coordinator::from_config(&config).context("Failed to set up CI providers")?;
    let report = coordinator
        .collect_report()
        .await
        .context("Failed to collect CI status")?;

    // Rendered in full before writing so a failure never leaves partial output
    let text = render(&report, args.format)?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .context("Failed to write to stdout")?;

    Ok(())
}
