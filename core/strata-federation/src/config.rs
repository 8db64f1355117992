use std::sync::Arc;
use strata_model::Tag;
use strata_repository::{
    IdentityResolver, InMemoryConfig, InMemoryRepository, LifecycleManager, Repository,
};

/// What a backend receives when the federation builds it.
#[derive(Clone)]
pub struct InitializerConfig {
    /// The federation's identity resolver, viewed as a lifecycle manager.
    /// Backends declare drafts through it so every new id gets recorded.
    pub lifecycle: Arc<dyn LifecycleManager>,
}

/// Builds one backend of a federation.
pub type RepoInitializer = Box<dyn FnOnce(InitializerConfig) -> Arc<dyn Repository> + Send>;

/// Configuration of a [`crate::FederatedRepository`].
pub struct FederationConfig {
    /// Tag of the federated repository itself.
    pub tag: Tag,
    pub resolver: Arc<dyn IdentityResolver>,
    /// Backend initializers, in pool order.
    pub repositories: Vec<RepoInitializer>,
}

impl FederationConfig {
    pub fn new(tag: impl Into<Tag>, resolver: Arc<dyn IdentityResolver>) -> Self {
        Self {
            tag: tag.into(),
            resolver,
            repositories: Vec::new(),
        }
    }

    /// Appends a backend initializer.
    #[must_use]
    pub fn with_repository(mut self, init: RepoInitializer) -> Self {
        self.repositories.push(init);
        self
    }
}

/// Initializer for an [`InMemoryRepository`] sharing the federation's resolver.
pub fn in_memory(config: InMemoryConfig) -> RepoInitializer {
    Box::new(move |init: InitializerConfig| -> Arc<dyn Repository> {
        Arc::new(InMemoryRepository::new(config, init.lifecycle))
    })
}
