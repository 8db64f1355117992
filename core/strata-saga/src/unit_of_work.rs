use crate::error::{SagaError, SagaResult};
use async_trait::async_trait;
use futures::future::BoxFuture;
use strata_repository::RepositoryResult;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A deferred action that undoes one write.
pub type Compensation = Box<dyn FnOnce() -> BoxFuture<'static, RepositoryResult<()>> + Send>;

/// A unit of work: a group of effects that succeed or get undone together.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Begins a new unit, dropping anything left over from a previous one.
    async fn start(&self);

    /// Keeps every effect of the unit.
    async fn commit(&self);

    /// Undoes every effect of the unit.
    async fn rollback(&self) -> SagaResult<()>;
}

/// Unit of work that undoes effects by running compensations.
///
/// Compensations run in reverse registration order, one at a time: each
/// is awaited before the next starts.
#[derive(Default)]
pub struct UnitOfWorkSaga {
    compensations: Mutex<Vec<Compensation>>,
}

impl UnitOfWorkSaga {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_compensation(&self, compensation: Compensation) {
        let mut compensations = self.compensations.lock().await;
        compensations.push(compensation);
        debug!("Registered compensation #{}", compensations.len());
    }

    /// Number of compensations waiting to run.
    pub async fn pending(&self) -> usize {
        self.compensations.lock().await.len()
    }
}

#[async_trait]
impl UnitOfWork for UnitOfWorkSaga {
    async fn start(&self) {
        let dropped = std::mem::take(&mut *self.compensations.lock().await).len();
        if dropped > 0 {
            warn!("Starting saga discarded {} stale compensations", dropped);
        }
    }

    async fn commit(&self) {
        let committed = std::mem::take(&mut *self.compensations.lock().await).len();
        debug!("Saga committed, {} compensations discarded", committed);
    }

    /// Runs compensations last-first. Stops at the first failure and
    /// reports how many compensations remain registered.
    async fn rollback(&self) -> SagaResult<()> {
        let total = self.pending().await;
        info!("Rolling back saga ({} compensations)", total);

        loop {
            // the lock is released before the compensation runs
            let next = self.compensations.lock().await.pop();
            let Some(compensation) = next else {
                break;
            };

            if let Err(source) = compensation().await {
                let remaining = self.pending().await;
                warn!("Compensation failed, {} left: {}", remaining, source);
                return Err(SagaError::CompensationFailed { remaining, source });
            }
        }

        info!("Saga rolled back");
        Ok(())
    }
}
