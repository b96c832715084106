//! Ordering and reduction of active projects into one report

use crate::status::{StatusCode, NO_ACTIVITY_GLYPH};
use crate::types::ActiveProject;
use serde::Serialize;

/// The single indicator summarizing every active project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "status")]
pub enum AggregateStatus {
    /// No repository has a recent run
    NoActivity,
    /// Highest-priority status present (baseline `Success`)
    Status(StatusCode),
}

impl AggregateStatus {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::NoActivity => NO_ACTIVITY_GLYPH,
            Self::Status(code) => code.glyph(),
        }
    }
}

/// Sort most recent first
///
/// Equal timestamps fall back to server name, then repository name, so the
/// order never depends on which lookup happened to finish first.
pub fn sort_projects(projects: &mut [ActiveProject]) {
    projects.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.server_name.cmp(&b.server_name))
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Reduce a set of projects to one indicator
///
/// Starts at `Success` and only moves to a status with strictly higher
/// priority, so statuses outside the priority table never surface while
/// anything at baseline or above is present.
pub fn overall_status(projects: &[ActiveProject]) -> AggregateStatus {
    if projects.is_empty() {
        return AggregateStatus::NoActivity;
    }

    let status = projects
        .iter()
        .map(|p| p.status)
        .fold(StatusCode::Success, |current, candidate| {
            if candidate.priority() > current.priority() {
                candidate
            } else {
                current
            }
        });

    AggregateStatus::Status(status)
}

/// One line of the per-repository list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayEntry<'a> {
    pub glyph: &'static str,
    pub name: &'a str,
    pub server_name: &'a str,
    pub url: &'a str,
}

/// Sorted projects plus their aggregate indicator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    aggregate: AggregateStatus,
    projects: Vec<ActiveProject>,
}

impl StatusReport {
    /// Sort and reduce a freshly collected set
    pub fn build(mut projects: Vec<ActiveProject>) -> Self {
        sort_projects(&mut projects);
        let aggregate = overall_status(&projects);
        Self {
            aggregate,
            projects,
        }
    }

    pub fn aggregate(&self) -> AggregateStatus {
        self.aggregate
    }

    /// Projects, most recently updated first
    pub fn projects(&self) -> &[ActiveProject] {
        &self.projects
    }

    /// `(glyph, name, server, url)` tuples in display order
    pub fn entries(&self) -> impl Iterator<Item = DisplayEntry<'_>> {
        self.projects.iter().map(|p| DisplayEntry {
            glyph: p.status.glyph(),
            name: &p.name,
            server_name: &p.server_name,
            url: &p.url,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
