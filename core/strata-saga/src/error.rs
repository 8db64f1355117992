//! Error types for saga coordination.

use strata_repository::RepositoryError;
use thiserror::Error;

/// Result type for saga operations.
pub type SagaResult<T> = Result<T, SagaError>;

/// Errors that can occur while coordinating a saga.
#[derive(Debug, Error)]
pub enum SagaError {
    /// A compensation failed during rollback. Rollback stopped there; the
    /// compensations that had not run yet are still registered.
    #[error("compensation failed ({remaining} still pending): {source}")]
    CompensationFailed {
        remaining: usize,
        #[source]
        source: RepositoryError,
    },

    /// Error from the wrapped repository.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
