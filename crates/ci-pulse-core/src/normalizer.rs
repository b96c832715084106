//! Translation of provider runs into [`ActiveProject`] records

use crate::status::StatusCode;
use crate::types::{ActiveProject, RepositoryRef, RunRecord};
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// Maximum age a run may have and still count as active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoff(Duration);

impl Cutoff {
    pub fn from_days(days: u32) -> Self {
        Self(Duration::days(i64::from(days)))
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self(duration)
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    /// `now - updated_at < cutoff`; a run exactly at the cutoff is stale
    pub fn is_active(&self, updated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(updated_at) < self.0
    }
}

/// Build the record for one repository, or `None` if its latest run is stale
///
/// An unrecognized status never fails the run; it becomes [`StatusCode::Unknown`].
pub fn normalize(
    repo: &RepositoryRef,
    run: &RunRecord,
    cutoff: Cutoff,
    server_name: &str,
    now: DateTime<Utc>,
) -> Option<ActiveProject> {
    if !cutoff.is_active(run.updated_at, now) {
        return None;
    }

    let raw = run.effective_status();
    let status = StatusCode::from_provider(run.provider, raw).unwrap_or_else(|| {
        warn!(
            "Unrecognized {} status '{}' for {} on {}",
            run.provider, raw, repo.full_name, server_name
        );
        StatusCode::Unknown
    });

    Some(ActiveProject {
        name: repo.full_name.clone(),
        url: run.url.clone(),
        status,
        server_name: server_name.to_string(),
        updated_at: run.updated_at,
    })
}
