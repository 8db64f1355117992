//! Federation of Strata repositories.
//!
//! A [`FederatedRepository`] fronts one backend per entity tag and exposes
//! them as a single repository. Writes route by the draft's tag; reads and
//! removals by id route through an [`IdentityResolver`].
//!
//! [`IdentityResolver`]: strata_repository::IdentityResolver

mod config;
mod pool;
mod repository;

pub use config::{FederationConfig, InitializerConfig, RepoInitializer, in_memory};
pub use pool::RepositoryPool;
pub use repository::FederatedRepository;
