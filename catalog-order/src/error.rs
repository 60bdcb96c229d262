//! Ordering error types

use thiserror::Error;

/// Errors raised by local list operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Move index outside `0..len`
    #[error("index {index} out of range for list of length {len}")]
    InvalidIndex { index: usize, len: usize },

    /// List contents violate an invariant (e.g. duplicate ids)
    #[error("invalid list state: {0}")]
    InvalidState(String),
}

/// Result type for ordering operations
pub type OrderResult<T> = Result<T, OrderError>;

/// Remote commit failed (network, validation, conflict)
///
/// Never returned as an `Err` from the persistence layer; it is caught,
/// triggers a revert and is surfaced through the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PersistenceError {
    message: String,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human-readable message shown to the user
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<shared::models::AssignmentError> for PersistenceError {
    fn from(err: shared::models::AssignmentError) -> Self {
        PersistenceError::new(err.to_string())
    }
}
