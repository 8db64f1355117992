//! Core entity model for Strata.
//!
//! Defines the universal types every repository backend speaks:
//! - [`Entity`]: an identified domain record (JSON props + lifecycle meta)
//! - [`DraftEntity`]: an entity whose identity may not be assigned yet
//! - [`EntityId`] / [`Tag`]: opaque identifiers for records and entity kinds
//! - [`IdentityRecord`]: what an identity resolver knows about a persisted id
//!
//! Backends never interpret `props`; they only route and persist. The
//! query engine reads fields through [`Entity::field`].

mod entity;
mod ids;
mod timestamp;

pub use entity::{rebuild, DraftEntity, DraftMeta, Entity, EntityMeta, Props, META_FIELDS};
pub use ids::{EntityId, IdentityRecord, Tag};
pub use timestamp::{advance, now_millis};
