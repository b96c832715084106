//! Normalized run status vocabulary
//!
//! Each provider reports run state in its own words. The two translation tables
//! below map those words onto [`StatusCode`]; the glyph and priority tables map
//! each code onto what the status bar shows and how urgent it is.

use crate::types::ProviderKind;
use serde::Serialize;

/// Glyph shown when no repository has recent activity
pub const NO_ACTIVITY_GLYPH: &str = "💤";

/// Provider-agnostic run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// Created but not yet queued
    Created,
    /// Waiting for a runner
    Pending,
    /// Executing
    Running,
    /// Finished successfully
    Success,
    /// Finished with a failure
    Failed,
    /// Canceled before finishing
    Canceled,
    /// Skipped entirely
    Skipped,
    /// Blocked on a manual action
    ActionRequired,
    /// Exceeded its time limit
    TimedOut,
    /// Finished without a pass/fail verdict
    Neutral,
    /// Superseded before finishing
    Stale,
    /// Scheduled for later
    Scheduled,
    /// Status string not present in the provider's table
    Unknown,
}

impl StatusCode {
    /// Translate a raw provider status, `None` if the table has no entry
    pub fn from_provider(provider: ProviderKind, raw: &str) -> Option<Self> {
        let raw = raw.to_ascii_lowercase();
        match provider {
            ProviderKind::GitHub => Self::from_github(&raw),
            ProviderKind::GitLab => Self::from_gitlab(&raw),
        }
    }

    /// GitHub Actions run statuses and conclusions
    fn from_github(raw: &str) -> Option<Self> {
        let code = match raw {
            "requested" => Self::Created,
            "queued" | "waiting" | "pending" => Self::Pending,
            "in_progress" => Self::Running,
            "success" => Self::Success,
            "failure" => Self::Failed,
            "cancelled" => Self::Canceled,
            "skipped" => Self::Skipped,
            "action_required" => Self::ActionRequired,
            "timed_out" => Self::TimedOut,
            "neutral" => Self::Neutral,
            "stale" => Self::Stale,
            _ => return None,
        };
        Some(code)
    }

    /// GitLab pipeline statuses
    fn from_gitlab(raw: &str) -> Option<Self> {
        let code = match raw {
            "created" => Self::Created,
            "waiting_for_resource" | "preparing" | "pending" => Self::Pending,
            "running" => Self::Running,
            "success" => Self::Success,
            "failed" => Self::Failed,
            "canceled" | "canceling" => Self::Canceled,
            "skipped" => Self::Skipped,
            "manual" => Self::ActionRequired,
            "scheduled" => Self::Scheduled,
            _ => return None,
        };
        Some(code)
    }

    /// Status bar glyph
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Created => "🟣",
            Self::Pending => "🟡",
            Self::Running => "🔵",
            Self::Success => "🟢",
            Self::Failed => "🔴",
            Self::Canceled => "🟠",
            Self::Skipped => "⚪️",
            Self::ActionRequired => "⚫️",
            Self::TimedOut => "🟤",
            Self::Neutral => "🔘",
            Self::Stale => "🟫",
            Self::Scheduled => "🕒",
            Self::Unknown => "❔",
        }
    }

    /// Weight used when reducing many statuses to one; 0 never wins over the baseline
    pub fn priority(self) -> u8 {
        match self {
            Self::Running => 3,
            Self::Failed => 2,
            Self::Success => 1,
            _ => 0,
        }
    }

    /// Every code, in declaration order
    pub const ALL: [StatusCode; 13] = [
        Self::Created,
        Self::Pending,
        Self::Running,
        Self::Success,
        Self::Failed,
        Self::Canceled,
        Self::Skipped,
        Self::ActionRequired,
        Self::TimedOut,
        Self::Neutral,
        Self::Stale,
        Self::Scheduled,
        Self::Unknown,
    ];
}
