use thiserror::Error;

/// Failure taxonomy for todo operations.
///
/// Every store and handler failure is one of these three. The API boundary
/// translates them to status codes (400 / 404 / 500) and never leaks the
/// detail of a [`Error::Store`] to callers.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid caller input, with a message safe to show.
    #[error("{0}")]
    Validation(String),

    /// The referenced id has no corresponding todo.
    #[error("Todo not found")]
    NotFound,

    /// The persistence layer failed for infrastructure reasons.
    #[error("storage failure: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
