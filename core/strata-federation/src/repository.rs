//! Tag-routed repository.
//!
//! Writes are routed by the tag carried on the draft. Reads and removals
//! by id ask the identity resolver which tag owns the id first; an id the
//! resolver does not know is treated as absent.

use crate::config::{FederationConfig, InitializerConfig};
use crate::pool::RepositoryPool;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use strata_model::{DraftEntity, Entity, EntityId, Tag};
use strata_query::{Page, Query};
use strata_repository::{
    Batch, BatchItem, BatchResult, Batchable, Deletable, Described, FEDERATED_KIND, Identified,
    IdentityResolver, LifecycleManager, Queryable, Readable, Repository, RepositoryError,
    RepositoryMeta, RepositoryResult, Writable,
};
use tracing::{debug, info, warn};

/// A repository that fronts a pool of backends, one per entity tag.
pub struct FederatedRepository {
    tag: Tag,
    resolver: Arc<dyn IdentityResolver>,
    pool: RepositoryPool,
}

impl FederatedRepository {
    /// Builds every backend and assembles the pool.
    ///
    /// Each backend receives the resolver as its lifecycle manager, so ids
    /// minted by any backend become resolvable through the federation.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTag` if two backends claim the same tag.
    pub fn new(config: FederationConfig) -> RepositoryResult<Self> {
        let FederationConfig {
            tag,
            resolver,
            repositories,
        } = config;

        let lifecycle: Arc<dyn LifecycleManager> = resolver.clone();
        let pool = RepositoryPool::build(repositories, &InitializerConfig { lifecycle })?;
        info!(
            "Federated repository {} ready with backends {:?}",
            tag,
            pool.tags()
        );

        Ok(Self {
            tag,
            resolver,
            pool,
        })
    }

    /// Tags of the pooled backends, in registration order.
    pub fn tags(&self) -> &[Tag] {
        self.pool.tags()
    }

    /// The backend registered for `tag`, if any.
    pub fn backend(&self, tag: &Tag) -> Option<Arc<dyn Repository>> {
        self.pool.get(tag.as_str()).cloned()
    }

    /// Runs a query against one backend, or against all of them.
    ///
    /// With a tag the backend's page is returned verbatim, cursor included.
    /// Without one the query goes to every backend concurrently and the
    /// results are concatenated in pool order. Aggregate results never
    /// carry a cursor: pagination across backends is not supported.
    pub async fn query_tagged(&self, query: &Query, tag: Option<&Tag>) -> RepositoryResult<Page> {
        if let Some(tag) = tag {
            return self.pool.resolve(tag)?.query(query).await;
        }

        let pages = join_all(self.pool.iter().map(|(_, repo)| repo.query(query))).await;
        let mut data = Vec::new();
        for page in pages {
            data.extend(page?.data);
        }
        Ok(Page::new(data, None))
    }

    async fn owner_of(&self, id: &EntityId) -> RepositoryResult<Option<Tag>> {
        Ok(self
            .resolver
            .get_id_entity(id)
            .await?
            .map(|record| record.entity_tag))
    }

    /// Ids whose last item in `items` is a removal.
    fn released_ids(items: &Batch) -> Vec<EntityId> {
        let mut released: Vec<EntityId> = Vec::new();
        for item in items {
            match item {
                BatchItem::Remove(id) => {
                    if !released.contains(id) {
                        released.push(id.clone());
                    }
                }
                BatchItem::Upsert(draft) => {
                    if let Some(id) = draft.id() {
                        released.retain(|r| r != id);
                    }
                }
            }
        }
        released
    }

    /// Groups batch items by owning tag, keeping their relative order.
    ///
    /// Removals whose owner is unknown are dropped.
    async fn partition(&self, batch: Batch) -> RepositoryResult<HashMap<Tag, Batch>> {
        let mut groups: HashMap<Tag, Batch> = HashMap::new();

        for item in batch {
            let tag = match &item {
                BatchItem::Upsert(draft) => draft.tag().clone(),
                BatchItem::Remove(id) => match self.owner_of(id).await? {
                    Some(tag) => tag,
                    None => {
                        debug!("Dropping batch removal of unresolved id {}", id);
                        continue;
                    }
                },
            };
            if !self.pool.contains(&tag) {
                return Err(RepositoryError::UnregisteredTag(tag));
            }
            groups.entry(tag).or_default().push(item);
        }

        Ok(groups)
    }
}

impl Described for FederatedRepository {
    fn meta(&self) -> RepositoryMeta {
        RepositoryMeta::repository(FEDERATED_KIND)
    }

    fn tag(&self) -> &Tag {
        &self.tag
    }
}

#[async_trait]
impl Readable for FederatedRepository {
    async fn get(&self, id: &EntityId) -> RepositoryResult<Option<Entity>> {
        let Some(tag) = self.owner_of(id).await? else {
            debug!("get: no owner for {}", id);
            return Ok(None);
        };
        self.pool.resolve(&tag)?.get(id).await
    }
}

#[async_trait]
impl Writable for FederatedRepository {
    async fn set(&self, draft: DraftEntity) -> RepositoryResult<Entity> {
        let repo = self.pool.resolve(draft.tag())?;
        debug!("set: routing {} draft", draft.tag());
        repo.set(draft).await
    }
}

#[async_trait]
impl Deletable for FederatedRepository {
    async fn remove(&self, id: &EntityId) -> RepositoryResult<()> {
        let Some(tag) = self.owner_of(id).await? else {
            debug!("remove: no owner for {}", id);
            return Ok(());
        };
        self.pool.resolve(&tag)?.remove(id).await?;
        self.resolver.release_id(id).await
    }
}

#[async_trait]
impl Queryable for FederatedRepository {
    async fn query(&self, query: &Query) -> RepositoryResult<Page> {
        self.query_tagged(query, None).await
    }
}

#[async_trait]
impl Batchable for FederatedRepository {
    /// Splits the batch per owning backend and submits the sub-batches
    /// concurrently.
    ///
    /// Any failing sub-batch, whether reported as `failed` or as an error,
    /// fails the whole result. Sub-batches that succeeded are not undone.
    async fn batch(&self, batch: Batch) -> RepositoryResult<BatchResult> {
        let mut groups = self.partition(batch).await?;

        let submissions: Vec<(Tag, Arc<dyn Repository>, Batch)> = self
            .pool
            .iter()
            .filter_map(|(tag, repo)| {
                groups
                    .remove(tag)
                    .map(|items| (tag.clone(), Arc::clone(repo), items))
            })
            .collect();

        let results = join_all(submissions.into_iter().map(|(tag, repo, items)| async move {
            debug!("batch: submitting {} items to {}", items.len(), tag);
            let released = Self::released_ids(&items);
            (tag, released, repo.batch(items).await)
        }))
        .await;

        let mut failures = Vec::new();
        let mut upserted_ids = Vec::new();
        let mut removed_ids = Vec::new();

        for (tag, released, result) in results {
            match result {
                Ok(result) if result.is_successful() => {
                    for id in &released {
                        self.resolver.release_id(id).await?;
                    }
                    upserted_ids.extend(
                        result
                            .upserted_ids
                            .into_iter()
                            .map(|i| Identified::tagged(i.id, tag.clone())),
                    );
                    removed_ids.extend(
                        result
                            .removed_ids
                            .into_iter()
                            .map(|i| Identified::tagged(i.id, tag.clone())),
                    );
                }
                Ok(_) => {
                    warn!("Sub-batch for {} reported failure", tag);
                    failures.push(tag);
                }
                Err(e) => {
                    warn!("Sub-batch for {} failed: {}", tag, e);
                    failures.push(tag);
                }
            }
        }

        if failures.is_empty() {
            Ok(BatchResult::successful(upserted_ids, removed_ids))
        } else {
            Ok(BatchResult::failed(failures))
        }
    }
}
