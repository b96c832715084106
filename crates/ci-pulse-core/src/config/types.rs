//! Configuration types

use super::discovery::ConfigError;
use crate::matcher::RepoMatcher;
use crate::normalizer::Cutoff;
use crate::types::ProviderKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cutoff used when the config file does not set one
pub const DEFAULT_DAYS_UNTIL_INACTIVE: u32 = 7;

fn default_days_until_inactive() -> u32 {
    DEFAULT_DAYS_UNTIL_INACTIVE
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Runs last updated this many days ago or earlier are dropped
    #[serde(default = "default_days_until_inactive", alias = "daysUntilInactive")]
    pub days_until_inactive: u32,
    /// Upper bound on in-flight run lookups (None = unbounded)
    #[serde(default)]
    pub max_concurrency: Option<usize>,
    /// Per-request timeout in seconds (None = transport default)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Servers grouped by provider family
    #[serde(default)]
    pub servers: ServersConfig,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            days_until_inactive: DEFAULT_DAYS_UNTIL_INACTIVE,
            max_concurrency: None,
            request_timeout_secs: None,
            servers: ServersConfig::default(),
        }
    }
}

/// Server entries: `[[servers.github]]` and `[[servers.gitlab]]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServersConfig {
    #[serde(default)]
    pub github: Vec<ServerConfig>,
    #[serde(default)]
    pub gitlab: Vec<ServerConfig>,
}

/// One CI server instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Human-readable name shown next to each repository
    pub name: String,
    /// API endpoint; the provider's hosted default when absent
    #[serde(default, alias = "baseURL")]
    pub base_url: Option<String>,
    /// Access token
    #[serde(default)]
    pub token: Option<String>,
    /// Environment variable holding the access token
    #[serde(default)]
    pub token_env: Option<String>,
    /// Glob patterns over `namespace/name`; empty matches nothing
    #[serde(default, alias = "projects")]
    pub repositories: Vec<String>,
}

impl ServerConfig {
    /// Resolve the access token, preferring the literal `token`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if neither source yields a non-empty token.
    pub fn access_token(&self) -> Result<String, ConfigError> {
        if let Some(token) = self.token.as_deref().filter(|t| !t.trim().is_empty()) {
            return Ok(token.trim().to_string());
        }

        let Some(var) = &self.token_env else {
            return Err(ConfigError::Invalid {
                message: format!("server '{}' has no token or token_env", self.name),
            });
        };

        match std::env::var(var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(ConfigError::Invalid {
                message: format!(
                    "server '{}': environment variable {var} is unset or empty",
                    self.name
                ),
            }),
        }
    }
}

impl PulseConfig {
    /// Recency cutoff as a duration
    pub fn cutoff(&self) -> Cutoff {
        Cutoff::from_days(self.days_until_inactive)
    }

    /// Request timeout, if configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// All servers tagged with their provider family
    pub fn servers(&self) -> impl Iterator<Item = (ProviderKind, &ServerConfig)> {
        self.servers
            .github
            .iter()
            .map(|s| (ProviderKind::GitHub, s))
            .chain(self.servers.gitlab.iter().map(|s| (ProviderKind::GitLab, s)))
    }

    /// Check the merged configuration before anything is built from it
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `days_until_inactive` is 0
    /// - `max_concurrency` or `request_timeout_secs` is set to 0
    /// - a server has an empty name, no resolvable token, or an invalid glob
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days_until_inactive == 0 {
            return Err(ConfigError::Invalid {
                message: "days_until_inactive must be at least 1".to_string(),
            });
        }

        if self.max_concurrency == Some(0) {
            return Err(ConfigError::Invalid {
                message: "max_concurrency must be at least 1 when set".to_string(),
            });
        }

        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                message: "request_timeout_secs must be at least 1 when set".to_string(),
            });
        }

        for (kind, server) in self.servers() {
            if server.name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    message: format!("a [[servers.{kind}]] entry has an empty name"),
                });
            }
            server.access_token()?;
            RepoMatcher::new(&server.repositories)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> PulseConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse("");
        assert_eq!(config.days_until_inactive, DEFAULT_DAYS_UNTIL_INACTIVE);
        assert!(config.max_concurrency.is_none());
        assert!(config.servers.github.is_empty());
        assert!(config.servers.gitlab.is_empty());
    }

    #[test]
    fn test_full_document() {
        let config = parse(
            r#"
            days_until_inactive = 3
            max_concurrency = 8

            [[servers.github]]
            name = "github.com"
            token = "ghp_abc"
            repositories = ["me/*", "org/service-?"]

            [[servers.gitlab]]
            name = "work"
            base_url = "https://gitlab.example.com"
            token = "glpat-xyz"
            projects = ["team/*"]
            "#,
        );

        assert_eq!(config.days_until_inactive, 3);
        assert_eq!(config.max_concurrency, Some(8));
        assert_eq!(config.servers.github[0].repositories, vec!["me/*", "org/service-?"]);
        assert_eq!(
            config.servers.gitlab[0].base_url.as_deref(),
            Some("https://gitlab.example.com")
        );
        assert_eq!(config.servers.gitlab[0].repositories, vec!["team/*"]);

        let kinds: Vec<ProviderKind> = config.servers().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![ProviderKind::GitHub, ProviderKind::GitLab]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_cutoff() {
        let config = PulseConfig {
            days_until_inactive: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("days_until_inactive"));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = PulseConfig {
            max_concurrency: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let mut config = PulseConfig::default();
        config.servers.github.push(ServerConfig {
            name: "gh".to_string(),
            token: Some("ghp_abc".to_string()),
            repositories: vec!["team/[".to_string()],
            ..Default::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("team/["));
    }

    #[test]
    fn test_validate_rejects_missing_token() {
        let mut config = PulseConfig::default();
        config.servers.gitlab.push(ServerConfig {
            name: "work".to_string(),
            repositories: vec!["team/*".to_string()],
            ..Default::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no token"));
    }

    #[test]
    fn test_access_token_prefers_literal() {
        let server = ServerConfig {
            name: "gh".to_string(),
            token: Some("  ghp_literal ".to_string()),
            token_env: Some("CI_PULSE_TEST_UNUSED_TOKEN".to_string()),
            ..Default::default()
        };
        assert_eq!(server.access_token().unwrap(), "ghp_literal");
    }

    #[test]
    fn test_access_token_missing_env_var() {
        let server = ServerConfig {
            name: "gh".to_string(),
            token_env: Some("CI_PULSE_TEST_TOKEN_THAT_IS_NEVER_SET".to_string()),
            ..Default::default()
        };
        let err = server.access_token().unwrap_err();
        assert!(err.to_string().contains("CI_PULSE_TEST_TOKEN_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_cutoff_from_days() {
        let config = PulseConfig {
            days_until_inactive: 2,
            ..Default::default()
        };
        assert_eq!(config.cutoff(), Cutoff::from_days(2));
    }
}
