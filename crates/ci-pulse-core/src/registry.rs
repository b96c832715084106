//! Provider registry: builds one client per configured server

use crate::config::ServerConfig;
use crate::error::PulseError;
use crate::github::GitHubActionsProvider;
use crate::gitlab::GitLabCiProvider;
use crate::provider::ErasedCiProvider;
use crate::types::ProviderKind;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A factory function that creates a CI provider for one server entry
pub type CiFactoryFn = Arc<
    dyn Fn(&ServerConfig, Option<Duration>) -> Result<Arc<dyn ErasedCiProvider>, PulseError>
        + Send
        + Sync,
>;

/// A factory that can create a CI provider instance
#[derive(Clone)]
pub struct CiProviderFactory {
    /// Provider family served by this factory
    pub kind: ProviderKind,
    /// Human-readable description
    pub description: String,
    /// Factory function: takes a server entry and request timeout, returns a provider
    pub create: CiFactoryFn,
}

impl std::fmt::Debug for CiProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CiProviderFactory")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("create", &"<factory_fn>")
            .finish()
    }
}

/// Registry for CI providers, keyed by provider family
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    factories: HashMap<ProviderKind, CiProviderFactory>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the GitHub and GitLab REST providers
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register(CiProviderFactory {
            kind: ProviderKind::GitHub,
            description: "GitHub Actions REST provider (built-in)".to_string(),
            create: Arc::new(create_github),
        });

        registry.register(CiProviderFactory {
            kind: ProviderKind::GitLab,
            description: "GitLab CI REST provider (built-in)".to_string(),
            create: Arc::new(create_gitlab),
        });

        registry
    }

    /// Register a CI provider factory
    ///
    /// If a factory for the same provider family already exists, it will be replaced.
    pub fn register(&mut self, factory: CiProviderFactory) {
        self.factories.insert(factory.kind, factory);
    }

    /// Create the provider for one server entry
    ///
    /// # Errors
    ///
    /// Returns `PulseError::ClientInit` if no factory is registered for `kind`,
    /// or whatever the factory itself returns.
    pub fn create_provider(
        &self,
        kind: ProviderKind,
        server: &ServerConfig,
        timeout: Option<Duration>,
    ) -> Result<Arc<dyn ErasedCiProvider>, PulseError> {
        let factory = self.factories.get(&kind).ok_or_else(|| {
            PulseError::client_init(format!("CI provider '{kind}' not registered"))
        })?;

        (factory.create)(server, timeout)
    }

    /// Check if a provider family is registered
    pub fn has_provider(&self, kind: ProviderKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Get the number of registered providers
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

fn create_github(
    server: &ServerConfig,
    timeout: Option<Duration>,
) -> Result<Arc<dyn ErasedCiProvider>, PulseError> {
    let token = server.access_token()?;
    let provider =
        GitHubActionsProvider::new(&server.name, server.base_url.as_deref(), &token, timeout)?;
    Ok(Arc::new(provider))
}

fn create_gitlab(
    server: &ServerConfig,
    timeout: Option<Duration>,
) -> Result<Arc<dyn ErasedCiProvider>, PulseError> {
    let token = server.access_token()?;
    let provider =
        GitLabCiProvider::new(&server.name, server.base_url.as_deref(), &token, timeout)?;
    Ok(Arc::new(provider))
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
