//! Mock CI provider for testing

use crate::error::PulseError;
use crate::provider::CiProvider;
use crate::types::{Page, ProviderKind, RepositoryRef, RunRecord};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock CI provider for testing. Returns canned data.
#[derive(Debug, Clone)]
pub struct MockCiProvider {
    /// Provider family to report
    pub kind: ProviderKind,
    /// Repositories returned from the listing, paged by `page_size`
    pub repos: Vec<RepositoryRef>,
    /// Latest run per repository ID
    pub runs: HashMap<u64, RunRecord>,
    /// Listing page size
    pub page_size: usize,
    /// If set, every listing call fails with an auth error carrying this message
    pub auth_error: Option<String>,
    /// Per-repository transport failures for `latest_run`
    pub run_errors: HashMap<u64, String>,
    /// Simulated latency of `latest_run`
    pub run_delay: Option<Duration>,
    /// Track calls for verification
    pub call_log: Arc<Mutex<Vec<MockCall>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

/// Record of method calls for test assertions
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    FetchRepositoryPage(u32),
    LatestRun(u64),
}

impl MockCiProvider {
    /// Create a new mock provider with empty data
    pub fn new() -> Self {
        Self {
            kind: ProviderKind::GitLab,
            repos: Vec::new(),
            runs: HashMap::new(),
            page_size: 100,
            auth_error: None,
            run_errors: HashMap::new(),
            run_delay: None,
            call_log: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock provider listing these repositories
    pub fn with_repos(repos: Vec<RepositoryRef>) -> Self {
        Self {
            repos,
            ..Self::new()
        }
    }

    /// Report a different provider family
    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the latest run for a repository
    pub fn with_run(mut self, repo_id: u64, run: RunRecord) -> Self {
        self.runs.insert(repo_id, run);
        self
    }

    /// Set the listing page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Make every listing call fail with an auth error
    pub fn with_auth_error(mut self, message: String) -> Self {
        self.auth_error = Some(message);
        self
    }

    /// Make the run lookup for one repository fail with a transport error
    pub fn with_run_error(mut self, repo_id: u64, message: String) -> Self {
        self.run_errors.insert(repo_id, message);
        self
    }

    /// Delay every run lookup
    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = Some(delay);
        self
    }

    /// Get a copy of the call log for assertions
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Highest number of `latest_run` calls observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Helper to log a call
    fn log_call(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }
}

impl Default for MockCiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CiProvider for MockCiProvider {
    async fn fetch_repository_page(&self, page: u32) -> Result<Page<RepositoryRef>, PulseError> {
        self.log_call(MockCall::FetchRepositoryPage(page));

        if let Some(message) = &self.auth_error {
            return Err(PulseError::Auth {
                message: message.clone(),
            });
        }

        let start = (page.saturating_sub(1) as usize) * self.page_size;
        let end = (start + self.page_size).min(self.repos.len());
        let items = self.repos.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_page = (end < self.repos.len()).then_some(page + 1);

        Ok(Page { items, next_page })
    }

    async fn latest_run(&self, repo: &RepositoryRef) -> Result<Option<RunRecord>, PulseError> {
        self.log_call(MockCall::LatestRun(repo.id));

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        if let Some(delay) = self.run_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = self.run_errors.get(&repo.id) {
            return Err(PulseError::Transport {
                message: message.clone(),
                source: None,
            });
        }

        Ok(self.runs.get(&repo.id).cloned())
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn provider_name(&self) -> &str {
        "MockCiProvider"
    }
}

/// Helper function to create a test repository
pub fn create_test_repo(id: u64, full_name: &str) -> RepositoryRef {
    RepositoryRef {
        id,
        full_name: full_name.to_string(),
        web_url: format!("https://gitlab.com/{full_name}"),
    }
}

/// Helper function to create a test run
pub fn create_test_run(
    provider: ProviderKind,
    status: &str,
    conclusion: Option<&str>,
    updated_at: DateTime<Utc>,
) -> RunRecord {
    RunRecord {
        provider,
        status: status.to_string(),
        conclusion: conclusion.map(str::to_string),
        url: format!("https://ci.example.com/runs/{}", updated_at.timestamp()),
        updated_at,
    }
}
