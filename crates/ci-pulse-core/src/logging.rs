//! Shared logging initialization for ci-pulse binaries.
//!
//! Output always goes to stderr: stdout belongs to the status bar.

use std::sync::OnceLock;

static INIT: OnceLock<()> = OnceLock::new();

/// Env var selecting the log level
pub const LOG_ENV: &str = "CI_PULSE_LOG";

fn parse_level(value: Option<&str>) -> tracing::Level {
    match value.unwrap_or("warn").to_ascii_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::WARN,
    }
}

/// Initialize process-level tracing output from `CI_PULSE_LOG`.
///
/// `verbose` forces at least `debug`. Safe to call multiple times; only the
/// first call initializes the subscriber.
pub fn init(verbose: bool) {
    if INIT.get().is_some() {
        return;
    }

    let from_env = std::env::var(LOG_ENV).ok();
    let level = parse_level(from_env.as_deref());
    let level = if verbose { level.max(tracing::Level::DEBUG) } else { level };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    let _ = INIT.set(());
}
