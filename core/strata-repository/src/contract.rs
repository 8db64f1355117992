//! The repository contract.
//!
//! Every operation lives in its own capability trait so that callers can
//! ask for exactly what they need: a reporting job takes a
//! [`ReadonlyRepository`], an importer takes a [`WriteonlyRepository`].
//! [`Repository`] is the union of all capabilities and is implemented
//! automatically for any type that has them.

use crate::batch::{Batch, BatchResult};
use crate::error::RepositoryResult;
use async_trait::async_trait;
use serde::Serialize;
use strata_model::{DraftEntity, Entity, EntityId, Tag};
use strata_query::{Page, Query};

/// Resource kind of the in-memory backend.
pub const IN_MEMORY_KIND: &str = "in.memory.repo";
/// Resource kind of the federated router.
pub const FEDERATED_KIND: &str = "federated.repository";
/// Resource kind of the saga proxy.
pub const SAGA_KIND: &str = "saga.repository";

/// Static description of a repository implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepositoryMeta {
    pub resource: &'static str,
    pub kind: &'static str,
}

impl RepositoryMeta {
    /// Describes a repository of the given kind.
    pub const fn repository(kind: &'static str) -> Self {
        Self {
            resource: "repository",
            kind,
        }
    }
}

/// Identity of a repository: its implementation kind and the entity tag it owns.
pub trait Described: Send + Sync {
    fn meta(&self) -> RepositoryMeta;

    /// The entity tag this repository serves. Federated pools are keyed by it.
    fn tag(&self) -> &Tag;
}

#[async_trait]
pub trait Readable: Described {
    /// Returns the entity with this id, or `None` if there is none.
    async fn get(&self, id: &EntityId) -> RepositoryResult<Option<Entity>>;
}

#[async_trait]
pub trait Writable: Described {
    /// Declares the draft and persists it, replacing any entity with the same id.
    async fn set(&self, draft: DraftEntity) -> RepositoryResult<Entity>;
}

#[async_trait]
pub trait Deletable: Described {
    /// Removes the entity with this id. Unknown ids are a no-op.
    async fn remove(&self, id: &EntityId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait Queryable: Described {
    /// Runs a query. `Query::default()` returns everything.
    async fn query(&self, query: &Query) -> RepositoryResult<Page>;
}

#[async_trait]
pub trait Batchable: Described {
    /// Applies a batch of upserts and removals.
    async fn batch(&self, batch: Batch) -> RepositoryResult<BatchResult>;
}

/// The full repository contract.
pub trait Repository: Readable + Writable + Deletable + Queryable + Batchable {}

impl<T> Repository for T where
    T: Readable + Writable + Deletable + Queryable + Batchable + ?Sized
{
}

/// Read-only view: `get` and `query`.
pub trait ReadonlyRepository: Readable + Queryable {}

impl<T> ReadonlyRepository for T where T: Readable + Queryable + ?Sized {}

/// Write-only view: `set`, `remove` and `batch`.
pub trait WriteonlyRepository: Writable + Deletable + Batchable {}

impl<T> WriteonlyRepository for T where T: Writable + Deletable + Batchable + ?Sized {}
