use crate::config::{InitializerConfig, RepoInitializer};
use std::collections::HashMap;
use std::sync::Arc;
use strata_model::Tag;
use strata_repository::{Repository, RepositoryError, RepositoryResult};

/// Immutable `tag → backend` map that remembers registration order.
pub struct RepositoryPool {
    order: Vec<Tag>,
    by_tag: HashMap<Tag, Arc<dyn Repository>>,
}

impl RepositoryPool {
    /// Runs every initializer and keys the resulting backends by their tag.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateTag`] if two backends report the
    /// same tag.
    pub fn build(
        initializers: Vec<RepoInitializer>,
        init: &InitializerConfig,
    ) -> RepositoryResult<Self> {
        let mut order = Vec::with_capacity(initializers.len());
        let mut by_tag = HashMap::with_capacity(initializers.len());

        for initializer in initializers {
            let repo = initializer(init.clone());
            let tag = repo.tag().clone();
            if by_tag.contains_key(&tag) {
                return Err(RepositoryError::DuplicateTag(tag));
            }
            order.push(tag.clone());
            by_tag.insert(tag, repo);
        }

        Ok(Self { order, by_tag })
    }

    /// Looks up the backend for a tag.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::UnregisteredTag`] when no backend owns it.
    pub fn resolve(&self, tag: &Tag) -> RepositoryResult<&Arc<dyn Repository>> {
        self.by_tag
            .get(tag)
            .ok_or_else(|| RepositoryError::UnregisteredTag(tag.clone()))
    }

    pub fn get(&self, tag: &str) -> Option<&Arc<dyn Repository>> {
        self.by_tag.get(tag)
    }

    pub fn contains(&self, tag: &Tag) -> bool {
        self.by_tag.contains_key(tag)
    }

    /// Tags in registration order.
    pub fn tags(&self) -> &[Tag] {
        &self.order
    }

    /// Backends in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &Arc<dyn Repository>)> {
        self.order
            .iter()
            .filter_map(|tag| self.by_tag.get(tag).map(|repo| (tag, repo)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
