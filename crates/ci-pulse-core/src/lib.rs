//! Core library for ci-pulse: multi-provider CI status aggregation
//!
//! Polls every configured GitHub and GitLab server for the latest run of each
//! allow-listed repository, drops runs older than the configured cutoff, and
//! reduces what remains to one aggregate status plus a most-recent-first list.
//!
//! The entry point is [`Coordinator`]:
//!
//! ```no_run
//! use ci_pulse_core::config::{resolve_config, ConfigOverrides};
//! use ci_pulse_core::Coordinator;
//!
//! # async fn example() -> Result<(), ci_pulse_core::PulseError> {
//! let config = resolve_config(&ConfigOverrides::default())?;
//! let report = Coordinator::from_config(&config)?.collect_report().await?;
//! println!("{}", report.aggregate().glyph());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod github;
pub mod gitlab;
mod http;
pub mod logging;
pub mod matcher;
#[cfg(any(test, feature = "test-support"))]
pub mod mock_provider;
pub mod normalizer;
pub mod paging;
pub mod provider;
pub mod registry;
pub mod status;
pub mod types;

pub use aggregator::{AggregateStatus, DisplayEntry, StatusReport};
pub use coordinator::Coordinator;
pub use error::PulseError;
pub use matcher::RepoMatcher;
pub use normalizer::{normalize, Cutoff};
pub use provider::{CiProvider, ErasedCiProvider};
pub use registry::{CiProviderFactory, ProviderRegistry};
pub use status::StatusCode;
pub use types::{ActiveProject, Page, ProviderKind, RepositoryRef, RunRecord};
