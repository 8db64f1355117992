//! Error types for query evaluation.

use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while executing a query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The cursor is not a decimal page index.
    #[error("invalid cursor: {0:?}")]
    InvalidCursor(String),
}
