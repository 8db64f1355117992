//! Collaborators that own entity identity.
//!
//! Repositories never mint ids or timestamps themselves. They hand every
//! draft to a [`LifecycleManager`], which returns the fully identified
//! entity to persist. A federation additionally needs an
//! [`IdentityResolver`] to find out which backend owns a given id.

use crate::error::RepositoryResult;
use async_trait::async_trait;
use strata_model::{DraftEntity, Entity, EntityId, IdentityRecord};

/// Assigns identity metadata to drafts.
#[async_trait]
pub trait LifecycleManager: Send + Sync {
    /// Turns a draft into an identified entity.
    ///
    /// Implementations keep the id and `created_at` of drafts that already
    /// have them, and assign fresh ones otherwise. The idempotency key, if
    /// any, is read from the draft.
    async fn declare_entity(&self, draft: DraftEntity) -> RepositoryResult<Entity>;

    /// Structural check only; never mutates or persists anything.
    async fn validate_entity(&self, draft: &DraftEntity) -> bool;
}

/// A lifecycle manager that also remembers which tag owns each id.
#[async_trait]
pub trait IdentityResolver: LifecycleManager {
    /// Looks up a previously declared id. `None` when the id is unknown.
    async fn get_id_entity(&self, id: &EntityId) -> RepositoryResult<Option<IdentityRecord>>;

    /// Called once the entity behind `id` has been removed from its owner.
    ///
    /// Resolvers that keep an ownership record should drop it so the id no
    /// longer resolves. The default keeps everything.
    async fn release_id(&self, _id: &EntityId) -> RepositoryResult<()> {
        Ok(())
    }
}
