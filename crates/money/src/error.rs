//! Ledger errors.

use tracker_core::{CoreError, TransactionId};
use tracker_storage::StorageError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, MoneyError>;

/// Errors returned by [`crate::MoneyLedger`].
#[derive(Debug, thiserror::Error)]
pub enum MoneyError {
    /// Transaction is absent or belongs to someone else
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    /// Input failed validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] CoreError),

    /// Persistence layer failed
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl MoneyError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MoneyError::Storage(_))
    }
}
