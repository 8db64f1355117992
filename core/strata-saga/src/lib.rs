//! Saga compensation for Strata repositories.
//!
//! Wrap any repository in a [`SagaRepository`] and every `set`/`remove`
//! through it registers an undo action with a shared [`UnitOfWorkSaga`].
//! Calling [`UnitOfWork::rollback`] then runs those actions newest-first.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use strata_model::{DraftEntity, Props};
//! use strata_repository::{InMemoryConfig, InMemoryRepository, Writable};
//! use strata_saga::{SagaRepository, UnitOfWork, UnitOfWorkSaga};
//!
//! let saga = Arc::new(UnitOfWorkSaga::new());
//! let orders = Arc::new(InMemoryRepository::standalone(InMemoryConfig::new("order")));
//! let repo = SagaRepository::new(orders, saga.clone());
//!
//! repo.set(DraftEntity::new("order", "v1", Props::new())).await?;
//! saga.rollback().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod repository;
mod unit_of_work;

pub use error::{SagaError, SagaResult};
pub use repository::SagaRepository;
pub use unit_of_work::{Compensation, UnitOfWork, UnitOfWorkSaga};
