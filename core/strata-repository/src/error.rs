//! Error types for the repository layer.

use strata_model::Tag;
use strata_query::QueryError;
use thiserror::Error;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur in repository operations.
///
/// Absence is not an error: `get` on an unknown id yields `None` and
/// `remove` on an unknown id is a no-op.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No backend is registered for the tag. Fatal configuration error.
    #[error("no repository registered for tag \"{0}\"")]
    UnregisteredTag(Tag),

    /// Two backends in one pool claim the same tag.
    #[error("duplicate repository tag \"{0}\"")]
    DuplicateTag(Tag),

    /// Failure reported by a storage backend.
    #[error("backend error: {0}")]
    Backend(String),

    /// A draft was rejected by a lifecycle manager.
    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    /// Query could not be evaluated.
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
