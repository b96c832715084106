//! Provider trait for CI operations across platforms

use crate::error::PulseError;
use crate::types::{Page, ProviderKind, RepositoryRef, RunRecord};
use std::future::Future;
use std::pin::Pin;

/// Async trait for provider-agnostic CI operations.
///
/// Each CI platform (GitHub Actions, GitLab CI) implements this trait.
/// Uses RPITIT (Return Position Impl Trait in Traits) with explicit Send bounds.
pub trait CiProvider: Send + Sync + std::fmt::Debug {
    /// Fetch one page (1-based) of repositories visible to the token
    fn fetch_repository_page(
        &self,
        page: u32,
    ) -> impl Future<Output = Result<Page<RepositoryRef>, PulseError>> + Send;

    /// Most recently created run of a repository, `None` if it has never run
    fn latest_run(
        &self,
        repo: &RepositoryRef,
    ) -> impl Future<Output = Result<Option<RunRecord>, PulseError>> + Send;

    /// Provider family
    fn kind(&self) -> ProviderKind;

    /// Provider name for logging/display
    fn provider_name(&self) -> &str;
}

/// Object-safe version of CiProvider for type erasure.
///
/// This trait is implemented automatically for all types that implement CiProvider.
/// Allows storing `Arc<dyn ErasedCiProvider>` in the coordinator and sharing it
/// across spawned lookups.
pub trait ErasedCiProvider: Send + Sync + std::fmt::Debug {
    fn fetch_repository_page<'a>(
        &'a self,
        page: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Page<RepositoryRef>, PulseError>> + Send + 'a>>;

    fn latest_run<'a>(
        &'a self,
        repo: &'a RepositoryRef,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RunRecord>, PulseError>> + Send + 'a>>;

    fn kind(&self) -> ProviderKind;

    fn provider_name(&self) -> &str;
}

/// Blanket implementation of ErasedCiProvider for all CiProvider types.
impl<T: CiProvider> ErasedCiProvider for T {
    fn fetch_repository_page<'a>(
        &'a self,
        page: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Page<RepositoryRef>, PulseError>> + Send + 'a>> {
        Box::pin(CiProvider::fetch_repository_page(self, page))
    }

    fn latest_run<'a>(
        &'a self,
        repo: &'a RepositoryRef,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RunRecord>, PulseError>> + Send + 'a>> {
        Box::pin(CiProvider::latest_run(self, repo))
    }

    fn kind(&self) -> ProviderKind {
        CiProvider::kind(self)
    }

    fn provider_name(&self) -> &str {
        CiProvider::provider_name(self)
    }
}
