//! Order processor error types.

use thiserror::Error;

use energy_maximum_core::TransitionRejected;

use crate::db::RepositoryError;

/// Errors that can occur during order operations.
///
/// Whenever one of these is returned from inside a transaction, that
/// transaction has already been rolled back.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No live order has the requested id.
    #[error("order not found")]
    NotFound,

    /// The state machine refused the requested status.
    #[error(transparent)]
    Conflict(#[from] TransitionRejected),

    /// The order names a customer that does not exist.
    #[error("{0} not found")]
    MissingReference(String),

    /// Storage failure.
    #[error("database error: {0}")]
    Repository(#[source] RepositoryError),

    /// The operation did not finish within its deadline.
    #[error("order operation exceeded its deadline")]
    Cancelled,
}

impl From<RepositoryError> for OrderError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::MissingReference(what) => Self::MissingReference(what),
            other => Self::Repository(other),
        }
    }
}
