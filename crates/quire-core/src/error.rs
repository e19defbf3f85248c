//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
///
/// Payload validation has its own structured error in [`crate::validation`];
/// a missing post is an `Ok(None)` from the repository.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Malformed post id: {0:?}")]
    MalformedId(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
