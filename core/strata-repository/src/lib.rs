//! Storage-agnostic repository contract for Strata.
//!
//! - [`contract`]: capability traits (`Readable`, `Writable`, ...) and the
//!   [`Repository`] union every backend implements
//! - [`BatchItem`] / [`BatchResult`]: the batch model
//! - [`LifecycleManager`] / [`IdentityResolver`]: collaborators that assign
//!   and look up entity identity
//! - [`memory`]: in-process backend and collaborators for tests and development

mod batch;
pub mod contract;
mod error;
mod lifecycle;
pub mod memory;

pub use batch::{Batch, BatchItem, BatchResult, BatchStatus, Identified};
pub use contract::{
    Batchable, Deletable, Described, FEDERATED_KIND, IN_MEMORY_KIND, Queryable, Readable,
    ReadonlyRepository, Repository, RepositoryMeta, SAGA_KIND, Writable, WriteonlyRepository,
};
pub use error::{RepositoryError, RepositoryResult};
pub use lifecycle::{IdentityResolver, LifecycleManager};
pub use memory::{
    InMemoryConfig, InMemoryIdentityResolver, InMemoryLifecycleManager, InMemoryRepository,
};

pub use strata_query::Page;
