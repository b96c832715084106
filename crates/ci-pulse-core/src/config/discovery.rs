//! Configuration discovery and resolution

use super::types::PulseConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Env var naming an explicit config file
pub const CONFIG_ENV: &str = "CI_PULSE_CONFIG";
/// Env var overriding the home directory used for the default config path
pub const HOME_ENV: &str = "CI_PULSE_HOME";
/// Env var overriding `days_until_inactive`
pub const DAYS_ENV: &str = "CI_PULSE_DAYS_UNTIL_INACTIVE";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration not found
    #[error("Configuration not found")]
    NotFound,

    /// Parsed but semantically invalid
    #[error("{message}")]
    Invalid { message: String },
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Path to config file override
    pub config_path: Option<PathBuf>,
    /// Override the recency cutoff
    pub days_until_inactive: Option<u32>,
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables
/// 3. Config file
/// 4. Defaults
///
/// The result has passed [`PulseConfig::validate`].
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<PulseConfig, ConfigError> {
    let path = resolve_config_path(overrides.config_path.as_deref())?;
    debug!("Loading config from {}", path.display());

    let mut config = load_config_file(&path)?;

    apply_env_overrides(&mut config)?;
    apply_cli_overrides(&mut config, overrides);

    config.validate()?;
    Ok(config)
}

/// Find the config file to load
///
/// Precedence: explicit path, `CI_PULSE_CONFIG`, then
/// `<home>/.config/ci-pulse/config.toml` where home is `CI_PULSE_HOME` or the
/// platform home directory. An explicit path that does not exist is an error
/// rather than a fallthrough.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let candidate = match explicit {
        Some(path) => path.to_path_buf(),
        None => match non_empty_env(CONFIG_ENV) {
            Some(path) => PathBuf::from(path),
            None => home_dir()?.join(".config/ci-pulse/config.toml"),
        },
    };

    if candidate.is_file() {
        Ok(candidate)
    } else {
        debug!("No config file at {}", candidate.display());
        Err(ConfigError::NotFound)
    }
}

/// Load config from a TOML file
pub fn load_config_file(path: &Path) -> Result<PulseConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: PulseConfig = toml::from_str(&contents)?;
    Ok(config)
}

fn home_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = non_empty_env(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or(ConfigError::NotFound)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Apply environment variable overrides
fn apply_env_overrides(config: &mut PulseConfig) -> Result<(), ConfigError> {
    if let Some(days) = non_empty_env(DAYS_ENV) {
        config.days_until_inactive = days.trim().parse().map_err(|_| ConfigError::Invalid {
            message: format!("{DAYS_ENV} must be a whole number of days, got '{days}'"),
        })?;
    }
    Ok(())
}

/// Apply command-line overrides
fn apply_cli_overrides(config: &mut PulseConfig, overrides: &ConfigOverrides) {
    if let Some(days) = overrides.days_until_inactive {
        config.days_until_inactive = days;
    }
}
