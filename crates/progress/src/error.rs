//! Habit tracker errors.

use tracker_core::{CoreError, HabitId};
use tracker_storage::StorageError;

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors returned by [`crate::HabitTracker`].
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Habit is absent or belongs to someone else.
    ///
    /// Both cases share one variant so callers cannot probe for other
    /// users' habits.
    #[error("Habit not found: {0}")]
    NotFound(HabitId),

    /// Input rejected by the habit model
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] CoreError),

    /// Persistence layer failed; nothing was written
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl TrackerError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TrackerError::Storage(_))
    }
}
