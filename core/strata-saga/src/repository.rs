use crate::unit_of_work::{Compensation, UnitOfWorkSaga};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use strata_model::{DraftEntity, Entity, EntityId, Tag};
use strata_query::{Page, Query};
use strata_repository::{
    Batch, BatchResult, Batchable, Deletable, Described, Queryable, Readable, Repository,
    RepositoryMeta, RepositoryResult, SAGA_KIND, Writable,
};
use tracing::debug;

/// Repository proxy that registers a compensation for every `set` and
/// `remove` it forwards.
///
/// Reads, queries and batches pass straight through. A batch is not
/// compensated.
pub struct SagaRepository<R: ?Sized> {
    inner: Arc<R>,
    saga: Arc<UnitOfWorkSaga>,
}

impl<R> SagaRepository<R>
where
    R: Repository + ?Sized + 'static,
{
    pub fn new(inner: Arc<R>, saga: Arc<UnitOfWorkSaga>) -> Self {
        Self { inner, saga }
    }

    /// The wrapped repository.
    pub fn inner(&self) -> &Arc<R> {
        &self.inner
    }

    pub fn saga(&self) -> &Arc<UnitOfWorkSaga> {
        &self.saga
    }

    fn restore(&self, previous: Entity) -> Compensation {
        let inner = Arc::clone(&self.inner);
        Box::new(move || -> BoxFuture<'static, RepositoryResult<()>> {
            Box::pin(async move {
                debug!("Compensating: restoring {}", previous.id());
                inner.set(previous.into()).await.map(|_| ())
            })
        })
    }

    fn undo_create(&self, id: EntityId) -> Compensation {
        let inner = Arc::clone(&self.inner);
        Box::new(move || -> BoxFuture<'static, RepositoryResult<()>> {
            Box::pin(async move {
                debug!("Compensating: removing created {}", id);
                inner.remove(&id).await
            })
        })
    }
}

impl<R> Described for SagaRepository<R>
where
    R: Repository + ?Sized + 'static,
{
    fn meta(&self) -> RepositoryMeta {
        RepositoryMeta::repository(SAGA_KIND)
    }

    fn tag(&self) -> &Tag {
        self.inner.tag()
    }
}

#[async_trait]
impl<R> Readable for SagaRepository<R>
where
    R: Repository + ?Sized + 'static,
{
    async fn get(&self, id: &EntityId) -> RepositoryResult<Option<Entity>> {
        self.inner.get(id).await
    }
}

#[async_trait]
impl<R> Writable for SagaRepository<R>
where
    R: Repository + ?Sized + 'static,
{
    async fn set(&self, draft: DraftEntity) -> RepositoryResult<Entity> {
        let previous = match draft.id() {
            Some(id) => self.inner.get(id).await?,
            None => None,
        };

        let next = self.inner.set(draft).await?;

        let compensation = match previous {
            Some(previous) => self.restore(previous),
            None => self.undo_create(next.id().clone()),
        };
        self.saga.register_compensation(compensation).await;

        Ok(next)
    }
}

#[async_trait]
impl<R> Deletable for SagaRepository<R>
where
    R: Repository + ?Sized + 'static,
{
    async fn remove(&self, id: &EntityId) -> RepositoryResult<()> {
        let Some(previous) = self.inner.get(id).await? else {
            return Ok(());
        };

        self.saga.register_compensation(self.restore(previous)).await;
        self.inner.remove(id).await
    }
}

#[async_trait]
impl<R> Queryable for SagaRepository<R>
where
    R: Repository + ?Sized + 'static,
{
    async fn query(&self, query: &Query) -> RepositoryResult<Page> {
        self.inner.query(query).await
    }
}

#[async_trait]
impl<R> Batchable for SagaRepository<R>
where
    R: Repository + ?Sized + 'static,
{
    async fn batch(&self, batch: Batch) -> RepositoryResult<BatchResult> {
        self.inner.batch(batch).await
    }
}
