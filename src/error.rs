//! Error types shared by the services, the identity layer and the HTTP surface.

use sea_orm::DbErr;
use thiserror::Error;

/// Errors returned by study-circle operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested study, session or join code does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Required input was empty or malformed. Raised before any store access.
    #[error("{0}")]
    Validation(String),

    /// The caller lacks the capability for this operation.
    #[error("only the study leader can {0}")]
    Forbidden(&'static str),

    /// The document store rejected or failed the operation.
    #[error("store error: {0}")]
    Store(#[from] DbErr),

    /// The anonymous identity could not be read or established.
    #[error("identity error: {0}")]
    Identity(String),

    /// Placeholder for identity flows that are not wired up.
    #[error("{0} not implemented")]
    NotImplemented(&'static str),

    /// The system random source failed.
    #[error("random source failed: {0}")]
    Entropy(String),

    /// Every attempt to claim a fresh join code hit a concurrent claim.
    #[error("could not claim a unique join code after {0} attempts")]
    JoinCodeExhausted(usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Whether the store refused a write because a unique key already exists.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Error::Store(err) if matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_)))
        )
    }
}
