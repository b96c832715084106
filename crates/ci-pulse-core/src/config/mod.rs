//! Configuration resolution
//!
//! Resolves configuration from multiple sources with priority:
//! 1. Command-line flags (passed as [`ConfigOverrides`])
//! 2. Environment variables
//! 3. Config file (`--config`, `CI_PULSE_CONFIG`, or `~/.config/ci-pulse/config.toml`)
//! 4. Defaults

mod discovery;
mod types;

pub use discovery::{
    load_config_file, resolve_config, resolve_config_path, ConfigError, ConfigOverrides,
    CONFIG_ENV, DAYS_ENV, HOME_ENV,
};
pub use types::{PulseConfig, ServerConfig, ServersConfig, DEFAULT_DAYS_UNTIL_INACTIVE};
