use crate::error::{RepositoryError, RepositoryResult};
use crate::lifecycle::{IdentityResolver, LifecycleManager};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use strata_model::{
    DraftEntity, Entity, EntityId, EntityMeta, IdentityRecord, Tag, advance, now_millis,
};
use tokio::sync::RwLock;
use tracing::debug;

/// Lifecycle manager for tests and local development.
///
/// Unidentified drafts get a UUID v7 id and the current time. Drafts that
/// already carry an id keep it, along with `created_at`; `updated_at` always
/// moves strictly forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryLifecycleManager;

impl InMemoryLifecycleManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LifecycleManager for InMemoryLifecycleManager {
    async fn declare_entity(&self, draft: DraftEntity) -> RepositoryResult<Entity> {
        if draft.tag().as_str().is_empty() {
            return Err(RepositoryError::InvalidEntity(
                "draft has an empty tag".to_string(),
            ));
        }

        let DraftEntity { props, meta } = draft;
        let now = now_millis();
        let created_at = meta.created_at.unwrap_or(now);
        let updated_at = match meta.updated_at {
            Some(previous) => advance(Some(previous)),
            None => now.max(created_at),
        };

        Ok(Entity {
            props,
            meta: EntityMeta {
                id: meta.id.unwrap_or_default(),
                created_at,
                updated_at,
                idempotency_key: meta.idempotency_key.unwrap_or_default(),
                tag: meta.tag,
                version: meta.version,
            },
        })
    }

    async fn validate_entity(&self, draft: &DraftEntity) -> bool {
        draft.is_identified() && !draft.tag().as_str().is_empty()
    }
}

/// Identity resolver backed by an in-process map of `id → tag`.
///
/// Every entity declared through it is recorded automatically, and released
/// ids are dropped again. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityResolver {
    lifecycle: InMemoryLifecycleManager,
    owners: Arc<RwLock<HashMap<EntityId, Tag>>>,
}

impl InMemoryIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an owner for an id declared elsewhere.
    pub async fn register(&self, id: EntityId, tag: Tag) {
        self.owners.write().await.insert(id, tag);
    }

    /// Drops the record for an id. Returns the tag it was mapped to.
    pub async fn forget(&self, id: &EntityId) -> Option<Tag> {
        self.owners.write().await.remove(id)
    }

    /// Number of known ids.
    pub async fn len(&self) -> usize {
        self.owners.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.owners.read().await.is_empty()
    }
}

#[async_trait]
impl LifecycleManager for InMemoryIdentityResolver {
    async fn declare_entity(&self, draft: DraftEntity) -> RepositoryResult<Entity> {
        let entity = self.lifecycle.declare_entity(draft).await?;
        self.owners
            .write()
            .await
            .insert(entity.id().clone(), entity.tag().clone());
        debug!("Recorded owner {} for {}", entity.tag(), entity.id());
        Ok(entity)
    }

    async fn validate_entity(&self, draft: &DraftEntity) -> bool {
        self.lifecycle.validate_entity(draft).await
    }
}

#[async_trait]
impl IdentityResolver for InMemoryIdentityResolver {
    async fn get_id_entity(&self, id: &EntityId) -> RepositoryResult<Option<IdentityRecord>> {
        Ok(self
            .owners
            .read()
            .await
            .get(id)
            .map(|tag| IdentityRecord::new(id.clone(), tag.clone())))
    }

    async fn release_id(&self, id: &EntityId) -> RepositoryResult<()> {
        if let Some(tag) = self.forget(id).await {
            debug!("Released {} from {}", id, tag);
        }
        Ok(())
    }
}
