//! GitHub Actions provider using the REST API

use crate::error::PulseError;
use crate::http::{build_client, get_json, header_str, normalize_base_url};
use crate::provider::CiProvider;
use crate::types::{Page, ProviderKind, RepositoryRef, RunRecord};
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Public GitHub API endpoint
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

const REPOS_PER_PAGE: &str = "100";

/// GitHub Actions provider for one server (github.com or an Enterprise host)
#[derive(Debug)]
pub struct GitHubActionsProvider {
    name: String,
    api_base: String,
    client: reqwest::Client,
}

impl GitHubActionsProvider {
    /// Create a provider for the given server
    ///
    /// `base_url` is the API root (`https://ghe.example.com/api/v3` for
    /// Enterprise); `None` means api.github.com.
    ///
    /// # Errors
    ///
    /// Returns `PulseError::ClientInit` for an unparseable base URL or a token
    /// that cannot be sent as a header.
    pub fn new(
        name: &str,
        base_url: Option<&str>,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, PulseError> {
        let api_base = normalize_base_url(base_url.unwrap_or(DEFAULT_GITHUB_API))?;
        let client = build_client(
            AUTHORIZATION,
            &format!("Bearer {token}"),
            "application/vnd.github+json",
            timeout,
        )?;

        Ok(Self {
            name: format!("GitHub Actions ({name})"),
            api_base,
            client,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Parse the `page` of the `rel="next"` entry of a `Link` header
    ///
    /// `<https://api.github.com/user/repos?page=2&per_page=100>; rel="next", <...>; rel="last"`
    fn parse_next_page(link: &str) -> Option<u32> {
        link.split(',').find_map(|entry| {
            let (target, params) = entry.split_once(';')?;
            let is_next = params
                .split(';')
                .any(|p| p.trim().eq_ignore_ascii_case(r#"rel="next""#));
            if !is_next {
                return None;
            }

            let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
            let url = Url::parse(target).ok()?;
            url.query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.parse().ok())
        })
    }

    fn parse_repo(gh_repo: GhRepo) -> RepositoryRef {
        RepositoryRef {
            id: gh_repo.id,
            full_name: gh_repo.full_name,
            web_url: gh_repo.html_url,
        }
    }

    fn parse_run(gh_run: GhRun) -> RunRecord {
        // The conclusion only refines the status once the run has completed
        let conclusion = if gh_run.status.eq_ignore_ascii_case("completed") {
            gh_run.conclusion
        } else {
            None
        };

        RunRecord {
            provider: ProviderKind::GitHub,
            status: gh_run.status,
            conclusion,
            url: gh_run.html_url,
            updated_at: gh_run.updated_at,
        }
    }
}

impl CiProvider for GitHubActionsProvider {
    async fn fetch_repository_page(&self, page: u32) -> Result<Page<RepositoryRef>, PulseError> {
        let url = format!("{}/user/repos", self.api_base);
        let page_arg = page.to_string();
        let request = self
            .client
            .get(&url)
            .query(&[("per_page", REPOS_PER_PAGE), ("page", page_arg.as_str())]);

        let (repos, headers) = get_json::<Vec<GhRepo>>(request, &format!("GET {url}")).await?;

        Ok(Page {
            items: repos.into_iter().map(Self::parse_repo).collect(),
            next_page: header_str(&headers, "link").and_then(Self::parse_next_page),
        })
    }

    async fn latest_run(&self, repo: &RepositoryRef) -> Result<Option<RunRecord>, PulseError> {
        let url = format!("{}/repos/{}/actions/runs", self.api_base, repo.full_name);
        let request = self
            .client
            .get(&url)
            .query(&[("per_page", "1"), ("page", "1")]);

        let (runs, _) = get_json::<GhRunList>(request, &format!("GET {url}")).await?;

        Ok(runs.workflow_runs.into_iter().next().map(Self::parse_run))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

/// GitHub repository JSON schema (subset of `GET /user/repos`)
#[derive(Debug, Deserialize)]
struct GhRepo {
    id: u64,
    full_name: String,
    html_url: String,
}

/// GitHub workflow run list JSON schema
#[derive(Debug, Deserialize)]
struct GhRunList {
    #[serde(default)]
    workflow_runs: Vec<GhRun>,
}

/// GitHub workflow run JSON schema
#[derive(Debug, Deserialize)]
struct GhRun {
    status: String,
    conclusion: Option<String>,
    html_url: String,
    updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_provider_creation() {
        let provider = GitHubActionsProvider::new("public", None, "ghp_abc", None).unwrap();
        assert_eq!(provider.provider_name(), "GitHub Actions (public)");
        assert_eq!(provider.api_base(), DEFAULT_GITHUB_API);
        assert_eq!(CiProvider::kind(&provider), ProviderKind::GitHub);
    }

    #[test]
    fn test_enterprise_base_url() {
        let provider = GitHubActionsProvider::new(
            "corp",
            Some("https://ghe.example.com/api/v3/"),
            "ghp_abc",
            None,
        )
        .unwrap();
        assert_eq!(provider.api_base(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = GitHubActionsProvider::new("x", Some("::nope"), "ghp_abc", None).unwrap_err();
        assert!(matches!(err, PulseError::ClientInit { .. }));
    }

    #[test]
    fn test_parse_next_page() {
        let link = r#"<https://api.github.com/user/repos?per_page=100&page=2>; rel="next", <https://api.github.com/user/repos?per_page=100&page=5>; rel="last""#;
        assert_eq!(GitHubActionsProvider::parse_next_page(link), Some(2));
    }

    #[test]
    fn test_parse_next_page_on_last_page() {
        let link = r#"<https://api.github.com/user/repos?per_page=100&page=1>; rel="first", <https://api.github.com/user/repos?per_page=100&page=4>; rel="prev""#;
        assert_eq!(GitHubActionsProvider::parse_next_page(link), None);
        assert_eq!(GitHubActionsProvider::parse_next_page(""), None);
    }

    #[test]
    fn test_parse_run_completed() {
        let gh_run: GhRun = serde_json::from_str(
            r#"{
                "status": "completed",
                "conclusion": "failure",
                "html_url": "https://github.com/owner/repo/actions/runs/123456789",
                "updated_at": "2026-01-01T00:05:00Z"
            }"#,
        )
        .unwrap();

        let run = GitHubActionsProvider::parse_run(gh_run);
        assert_eq!(run.provider, ProviderKind::GitHub);
        assert_eq!(run.effective_status(), "failure");
        assert_eq!(run.url, "https://github.com/owner/repo/actions/runs/123456789");
    }

    #[test]
    fn test_parse_run_in_progress_ignores_conclusion() {
        let gh_run = GhRun {
            status: "in_progress".to_string(),
            conclusion: Some("success".to_string()),
            html_url: "https://github.com/owner/repo/actions/runs/1".to_string(),
            updated_at: "2026-01-01T00:05:00Z".parse().unwrap(),
        };

        let run = GitHubActionsProvider::parse_run(gh_run);
        assert_eq!(run.conclusion, None);
        assert_eq!(run.effective_status(), "in_progress");
    }

    #[test]
    fn test_run_list_without_runs() {
        let list: GhRunList = serde_json::from_str(r#"{"total_count": 0}"#).unwrap();
        assert!(list.workflow_runs.is_empty());
    }
}
