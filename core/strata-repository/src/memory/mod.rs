//! In-process implementations of the repository contract and its
//! collaborators. Nothing here persists across restarts.

mod lifecycle;
mod repository;

pub use lifecycle::{InMemoryIdentityResolver, InMemoryLifecycleManager};
pub use repository::{InMemoryConfig, InMemoryRepository};
