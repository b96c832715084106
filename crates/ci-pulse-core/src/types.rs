//! Shared types for the provider abstraction

use crate::status::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported CI provider families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// GitHub Actions (github.com or GitHub Enterprise)
    GitHub,
    /// GitLab CI (gitlab.com or self-hosted)
    GitLab,
}

impl ProviderKind {
    /// Config key for this provider family (`servers.<key>`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A repository as reported by a provider's listing endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    /// Provider-specific numeric ID
    pub id: u64,
    /// Fully qualified `namespace/name`
    pub full_name: String,
    /// Web URL of the repository
    pub web_url: String,
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Next page number, `None` when exhausted
    pub next_page: Option<u32>,
}

/// The most recent run of a repository, still in provider vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// Provider family that produced this record
    pub provider: ProviderKind,
    /// Raw run status (e.g. "in_progress", "running", "completed")
    pub status: String,
    /// Final outcome, only present once the run has completed
    pub conclusion: Option<String>,
    /// Web URL to the run
    pub url: String,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl RunRecord {
    /// Raw status to translate: the conclusion when finished, else the live status
    pub fn effective_status(&self) -> &str {
        match self.conclusion.as_deref() {
            Some(conclusion) if !conclusion.is_empty() => conclusion,
            _ => &self.status,
        }
    }
}

/// A repository whose latest run is recent enough to report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveProject {
    /// Display name (`namespace/name`)
    pub name: String,
    /// Web URL to the run
    pub url: String,
    /// Normalized status
    pub status: StatusCode,
    /// Name of the configured server that reported it
    pub server_name: String,
    /// Last update of the run
    pub updated_at: DateTime<Utc>,
}
