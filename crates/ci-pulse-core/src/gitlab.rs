//! GitLab CI provider using the REST API (v4)

use crate::error::PulseError;
use crate::http::{build_client, get_json, header_str, normalize_base_url};
use crate::provider::CiProvider;
use crate::types::{Page, ProviderKind, RepositoryRef, RunRecord};
use chrono::{DateTime, Utc};
use reqwest::header::HeaderName;
use serde::Deserialize;
use std::time::Duration;

/// Hosted GitLab instance
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

const API_SUFFIX: &str = "/api/v4";
const PROJECTS_PER_PAGE: &str = "100";

/// GitLab CI provider for one server
#[derive(Debug)]
pub struct GitLabCiProvider {
    name: String,
    api_base: String,
    client: reqwest::Client,
}

impl GitLabCiProvider {
    /// Create a provider for the given server
    ///
    /// `base_url` may be the instance root or already end in `/api/v4`;
    /// `None` means gitlab.com.
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
        let root = normalize_base_url(base_url.unwrap_or(DEFAULT_GITLAB_URL))?;
        let api_base = if root.ends_with(API_SUFFIX) {
            root
        } else {
            format!("{root}{API_SUFFIX}")
        };

        let client = build_client(
            HeaderName::from_static("private-token"),
            token,
            "application/json",
            timeout,
        )?;

        Ok(Self {
            name: format!("GitLab CI ({name})"),
            api_base,
            client,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// `X-Next-Page` is empty on the last page
    fn parse_next_page(value: Option<&str>) -> Option<u32> {
        value.and_then(|v| v.trim().parse().ok()).filter(|page| *page > 0)
    }

    fn parse_project(project: GlProject) -> RepositoryRef {
        RepositoryRef {
            id: project.id,
            full_name: project.path_with_namespace,
            web_url: project.web_url,
        }
    }

    fn parse_pipeline(pipeline: GlPipeline) -> RunRecord {
        // Pipeline status is already final once finished; there is no separate conclusion
        RunRecord {
            provider: ProviderKind::GitLab,
            status: pipeline.status,
            conclusion: None,
            url: pipeline.web_url,
            updated_at: pipeline.updated_at,
        }
    }
}

impl CiProvider for GitLabCiProvider {
    async fn fetch_repository_page(&self, page: u32) -> Result<Page<RepositoryRef>, PulseError> {
        let url = format!("{}/projects", self.api_base);
        let page_arg = page.to_string();
        let request = self.client.get(&url).query(&[
            ("membership", "true"),
            ("simple", "true"),
            ("per_page", PROJECTS_PER_PAGE),
            ("page", page_arg.as_str()),
        ]);

        let (projects, headers) =
            get_json::<Vec<GlProject>>(request, &format!("GET {url}")).await?;

        Ok(Page {
            items: projects.into_iter().map(Self::parse_project).collect(),
            next_page: Self::parse_next_page(header_str(&headers, "x-next-page")),
        })
    }

    async fn latest_run(&self, repo: &RepositoryRef) -> Result<Option<RunRecord>, PulseError> {
        let url = format!("{}/projects/{}/pipelines", self.api_base, repo.id);
        let request = self.client.get(&url).query(&[
            ("per_page", "1"),
            ("order_by", "id"),
            ("sort", "desc"),
        ]);

        let (pipelines, _) = get_json::<Vec<GlPipeline>>(request, &format!("GET {url}")).await?;

        Ok(pipelines.into_iter().next().map(Self::parse_pipeline))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::GitLab
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

/// GitLab project JSON schema (subset of `GET /projects`)
#[derive(Debug, Deserialize)]
struct GlProject {
    id: u64,
    path_with_namespace: String,
    web_url: String,
}

/// GitLab pipeline JSON schema (subset of `GET /projects/:id/pipelines`)
#[derive(Debug, Deserialize)]
struct GlPipeline {
    status: String,
    web_url: String,
    updated_at: DateTime<Utc>,
}
