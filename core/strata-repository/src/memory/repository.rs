use crate::batch::{Batch, BatchItem, BatchResult, Identified};
use crate::contract::{
    Batchable, Deletable, Described, IN_MEMORY_KIND, Queryable, Readable, RepositoryMeta, Writable,
};
use crate::error::RepositoryResult;
use crate::lifecycle::LifecycleManager;
use crate::memory::InMemoryLifecycleManager;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use strata_model::{DraftEntity, Entity, EntityId, Tag};
use strata_query::{Page, Query, engine};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory repository configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InMemoryConfig {
    /// Entity tag served by the repository.
    pub tag: Tag,
    /// Entities present from the start, stored as given.
    #[serde(default)]
    pub seed: Vec<Entity>,
}

impl InMemoryConfig {
    pub fn new(tag: impl Into<Tag>) -> Self {
        Self {
            tag: tag.into(),
            seed: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Vec<Entity>) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self::new("entity")
    }
}

enum Step {
    Put(Entity),
    Delete(EntityId),
}

/// Non-persistent repository for tests and development.
///
/// Entities are kept in write order; re-setting an id moves it to the end.
pub struct InMemoryRepository {
    tag: Tag,
    lifecycle: Arc<dyn LifecycleManager>,
    entities: RwLock<Vec<Entity>>,
}

impl InMemoryRepository {
    /// Creates a repository that declares drafts through `lifecycle`.
    pub fn new(config: InMemoryConfig, lifecycle: Arc<dyn LifecycleManager>) -> Self {
        Self {
            tag: config.tag,
            lifecycle,
            entities: RwLock::new(config.seed),
        }
    }

    /// Creates a repository with its own [`InMemoryLifecycleManager`].
    pub fn standalone(config: InMemoryConfig) -> Self {
        Self::new(config, Arc::new(InMemoryLifecycleManager::new()))
    }

    /// Returns a copy of every stored entity, in storage order.
    pub async fn snapshot(&self) -> Vec<Entity> {
        self.entities.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }

    fn put(entities: &mut Vec<Entity>, entity: Entity) {
        entities.retain(|e| e.id() != entity.id());
        entities.push(entity);
    }

    async fn stored(&self, id: &EntityId) -> Option<Entity> {
        self.entities
            .read()
            .await
            .iter()
            .find(|e| e.id() == id)
            .cloned()
    }

    /// Carries the timestamps of the entity being replaced onto `draft`.
    ///
    /// `created_at` is kept unless the draft sets one. `updated_at` starts
    /// from the later of the two, so the declared value is strictly newer
    /// than the stored one.
    fn inherit(mut draft: DraftEntity, prior: Option<&Entity>) -> DraftEntity {
        if let Some(prior) = prior {
            let meta = &mut draft.meta;
            meta.created_at.get_or_insert(prior.meta.created_at);
            meta.updated_at = meta.updated_at.max(Some(prior.meta.updated_at));
        }
        draft
    }
}

impl Described for InMemoryRepository {
    fn meta(&self) -> RepositoryMeta {
        RepositoryMeta::repository(IN_MEMORY_KIND)
    }

    fn tag(&self) -> &Tag {
        &self.tag
    }
}

#[async_trait]
impl Readable for InMemoryRepository {
    async fn get(&self, id: &EntityId) -> RepositoryResult<Option<Entity>> {
        Ok(self
            .entities
            .read()
            .await
            .iter()
            .find(|e| e.id() == id)
            .cloned())
    }
}

#[async_trait]
impl Writable for InMemoryRepository {
    async fn set(&self, draft: DraftEntity) -> RepositoryResult<Entity> {
        let prior = match draft.id() {
            Some(id) => self.stored(id).await,
            None => None,
        };
        let draft = Self::inherit(draft, prior.as_ref());
        let entity = self.lifecycle.declare_entity(draft).await?;
        Self::put(&mut *self.entities.write().await, entity.clone());
        debug!("[{}] set {}", self.tag, entity.id());
        Ok(entity)
    }
}

#[async_trait]
impl Deletable for InMemoryRepository {
    async fn remove(&self, id: &EntityId) -> RepositoryResult<()> {
        self.entities.write().await.retain(|e| e.id() != id);
        debug!("[{}] removed {}", self.tag, id);
        Ok(())
    }
}

#[async_trait]
impl Queryable for InMemoryRepository {
    async fn query(&self, query: &Query) -> RepositoryResult<Page> {
        let entities = self.entities.read().await.clone();
        Ok(engine::execute(query, entities)?)
    }
}

#[async_trait]
impl Batchable for InMemoryRepository {
    /// Declares every upsert first, then applies all items in submission
    /// order under one write lock. A rejected draft aborts the whole batch
    /// before anything is stored.
    async fn batch(&self, batch: Batch) -> RepositoryResult<BatchResult> {
        // state of ids already touched earlier in this batch; `None` = removed
        let mut touched: HashMap<EntityId, Option<Entity>> = HashMap::new();
        let mut steps = Vec::with_capacity(batch.len());
        for item in batch {
            steps.push(match item {
                BatchItem::Upsert(draft) => {
                    let prior = match draft.id() {
                        Some(id) => match touched.get(id) {
                            Some(state) => state.clone(),
                            None => self.stored(id).await,
                        },
                        None => None,
                    };
                    let draft = Self::inherit(draft, prior.as_ref());
                    let entity = self.lifecycle.declare_entity(draft).await?;
                    touched.insert(entity.id().clone(), Some(entity.clone()));
                    Step::Put(entity)
                }
                BatchItem::Remove(id) => {
                    touched.insert(id.clone(), None);
                    Step::Delete(id)
                }
            });
        }

        let mut upserted_ids = Vec::new();
        let mut removed_ids = Vec::new();
        {
            let mut entities = self.entities.write().await;
            for step in steps {
                match step {
                    Step::Put(entity) => {
                        upserted_ids.push(Identified::new(entity.id().clone()));
                        Self::put(&mut entities, entity);
                    }
                    Step::Delete(id) => {
                        entities.retain(|e| e.id() != &id);
                        removed_ids.push(Identified::new(id));
                    }
                }
            }
        }

        debug!(
            "[{}] batch applied: {} upserted, {} removed",
            self.tag,
            upserted_ids.len(),
            removed_ids.len()
        );
        Ok(BatchResult::successful(upserted_ids, removed_ids))
    }
}
