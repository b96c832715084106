//! Lazy repository pagination shared by every provider

use crate::error::PulseError;
use crate::provider::ErasedCiProvider;
use crate::types::RepositoryRef;
use tracing::debug;

/// Walks a provider's repository listing one page at a time
///
/// Each provider only knows how to fetch page `n` and report the next page
/// number; this type owns the "accumulate until exhausted" loop.
#[derive(Debug)]
pub struct RepositoryPager<'a> {
    provider: &'a dyn ErasedCiProvider,
    next: Option<u32>,
}

impl<'a> RepositoryPager<'a> {
    pub fn new(provider: &'a dyn ErasedCiProvider) -> Self {
        Self {
            provider,
            next: Some(1),
        }
    }

    /// Next page of repositories, `Ok(None)` once exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<RepositoryRef>>, PulseError> {
        let Some(page) = self.next else {
            return Ok(None);
        };

        let fetched = self.provider.fetch_repository_page(page).await?;
        debug!(
            "{} page {page}: {} repositories, next {:?}",
            self.provider.provider_name(),
            fetched.items.len(),
            fetched.next_page
        );

        // A next page that does not move forward would loop forever
        self.next = fetched.next_page.filter(|next| *next > page);
        Ok(Some(fetched.items))
    }

    /// Drain every remaining page
    pub async fn collect_all(mut self) -> Result<Vec<RepositoryRef>, PulseError> {
        let mut all = Vec::new();
        while let Some(items) = self.next_page().await? {
            all.extend(items);
        }
        Ok(all)
    }
}
