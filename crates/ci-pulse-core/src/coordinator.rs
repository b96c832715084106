//! Concurrent fan-out over every configured server

use crate::aggregator::StatusReport;
use crate::config::PulseConfig;
use crate::error::PulseError;
use crate::matcher::RepoMatcher;
use crate::normalizer::{normalize, Cutoff};
use crate::paging::RepositoryPager;
use crate::provider::ErasedCiProvider;
use crate::registry::ProviderRegistry;
use crate::types::{ActiveProject, RepositoryRef};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// One configured server with its client and compiled allow-list
#[derive(Debug, Clone)]
pub struct ServerHandle {
    pub name: Arc<str>,
    pub matcher: RepoMatcher,
    pub provider: Arc<dyn ErasedCiProvider>,
}

type LookupResult = Result<Option<ActiveProject>, PulseError>;

/// Polls every server and gathers the active projects
///
/// All run lookups across all servers are in flight together; the result is
/// either every active project or the first error observed, never a mix.
#[derive(Debug)]
pub struct Coordinator {
    servers: Vec<ServerHandle>,
    cutoff: Cutoff,
    limit: Option<Arc<Semaphore>>,
}

impl Coordinator {
    pub fn new(servers: Vec<ServerHandle>, cutoff: Cutoff, max_concurrency: Option<usize>) -> Self {
        Self {
            servers,
            cutoff,
            limit: max_concurrency.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// Build clients for every server using the built-in providers
    ///
    /// # Errors
    ///
    /// Returns `PulseError::Config` or `PulseError::ClientInit` for the first
    /// server that cannot be set up.
    pub fn from_config(config: &PulseConfig) -> Result<Self, PulseError> {
        Self::from_config_with_registry(config, &ProviderRegistry::builtin())
    }

    /// Build clients for every server through the given registry
    pub fn from_config_with_registry(
        config: &PulseConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, PulseError> {
        let timeout = config.request_timeout();
        let servers = config
            .servers()
            .map(|(kind, server)| -> Result<ServerHandle, PulseError> {
                Ok(ServerHandle {
                    name: Arc::from(server.name.as_str()),
                    matcher: RepoMatcher::new(&server.repositories)?,
                    provider: registry.create_provider(kind, server, timeout)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(servers, config.cutoff(), config.max_concurrency))
    }

    pub fn servers(&self) -> &[ServerHandle] {
        &self.servers
    }

    /// Poll everything and build the sorted, reduced report
    pub async fn collect_report(&self) -> Result<StatusReport, PulseError> {
        self.collect_report_at(Utc::now()).await
    }

    /// Same as [`collect_report`](Self::collect_report), judging recency against `now`
    pub async fn collect_report_at(&self, now: DateTime<Utc>) -> Result<StatusReport, PulseError> {
        let projects = self.run_at(now).await?;
        Ok(StatusReport::build(projects))
    }

    /// Poll everything now
    pub async fn run(&self) -> Result<Vec<ActiveProject>, PulseError> {
        self.run_at(Utc::now()).await
    }

    /// Poll everything, judging recency against `now`
    ///
    /// `now` is fixed for the whole poll, so a run close to the cutoff is judged
    /// against the start of the poll rather than the moment its lookup returns.
    ///
    /// Repository discovery runs server by server; each matched repository is
    /// spawned immediately so lookups overlap with the remaining discovery.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<Vec<ActiveProject>, PulseError> {
        let mut join_set: JoinSet<LookupResult> = JoinSet::new();

        for server in &self.servers {
            let repos = match RepositoryPager::new(server.provider.as_ref()).collect_all().await {
                Ok(repos) => repos,
                Err(e) => {
                    // Already-spawned lookups are detached; their results are discarded
                    join_set.detach_all();
                    return Err(e);
                }
            };

            let total = repos.len();
            let mut matched = 0usize;
            for repo in repos {
                if !server.matcher.is_in_scope(&repo.full_name) {
                    continue;
                }
                debug!("{}: matched {}", server.name, repo.full_name);
                matched += 1;
                let lookup = Lookup {
                    provider: Arc::clone(&server.provider),
                    server_name: Arc::clone(&server.name),
                    repo,
                    cutoff: self.cutoff,
                    now,
                };
                join_set.spawn(lookup.run(self.limit.clone()));
            }

            info!(
                "{} ({}): {matched} of {total} repositories in scope",
                server.name,
                server.provider.provider_name()
            );
        }

        let mut projects = Vec::with_capacity(join_set.len());
        let mut first_error: Option<PulseError> = None;

        while let Some(joined) = join_set.join_next().await {
            let outcome = joined.unwrap_or_else(|e| {
                Err(PulseError::Task {
                    message: "run lookup task did not complete".to_string(),
                    source: Some(Box::new(e)),
                })
            });

            match outcome {
                Ok(Some(project)) => projects.push(project),
                Ok(None) => {}
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    } else {
                        debug!("Discarding additional error: {e}");
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(projects),
        }
    }
}

/// One unit of work: latest run lookup plus normalization for one repository
struct Lookup {
    provider: Arc<dyn ErasedCiProvider>,
    server_name: Arc<str>,
    repo: RepositoryRef,
    cutoff: Cutoff,
    now: DateTime<Utc>,
}

impl Lookup {
    async fn run(self, limit: Option<Arc<Semaphore>>) -> LookupResult {
        let _permit = match limit {
            Some(semaphore) => Some(semaphore.acquire_owned().await.map_err(|e| {
                PulseError::Task {
                    message: "concurrency limiter closed".to_string(),
                    source: Some(Box::new(e)),
                }
            })?),
            None => None,
        };

        let run = self.provider.latest_run(&self.repo).await?;
        Ok(run.and_then(|run| {
            normalize(&self.repo, &run, self.cutoff, &self.server_name, self.now)
        }))
    }
}
