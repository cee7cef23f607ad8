//! Storage trait abstraction.

use async_trait::async_trait;
use tracker_core::{
    Budget, Habit, HabitId, SavingsGoal, Transaction, TransactionId, UserId,
};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Document store for tracker records.
///
/// Every save replaces the whole document, so a reader sees either the old
/// or the new version and never a mix. Serializing concurrent writers to the
/// same document is the caller's job (see [`crate::KeyedLocks`]).
#[async_trait]
pub trait Storage: Send + Sync {
    // === Habit operations ===

    /// Save a habit (create or replace).
    async fn save_habit(&self, habit: &Habit) -> Result<()>;

    /// Load a habit by ID.
    async fn load_habit(&self, id: HabitId) -> Result<Option<Habit>>;

    /// List the habits owned by `owner`, in no particular order.
    async fn list_habits(&self, owner: UserId) -> Result<Vec<Habit>>;

    /// Delete a habit. Deleting a missing habit is not an error.
    async fn delete_habit(&self, id: HabitId) -> Result<()>;

    // === Money operations ===

    /// Save a transaction (create or replace).
    async fn save_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Load a transaction by ID.
    async fn load_transaction(&self, id: TransactionId) -> Result<Option<Transaction>>;

    /// List the transactions owned by `owner`.
    async fn list_transactions(&self, owner: UserId) -> Result<Vec<Transaction>>;

    /// Delete a transaction. Deleting a missing transaction is not an error.
    async fn delete_transaction(&self, id: TransactionId) -> Result<()>;

    /// Save a budget (create or replace).
    async fn save_budget(&self, budget: &Budget) -> Result<()>;

    /// List the budgets owned by `owner`.
    async fn list_budgets(&self, owner: UserId) -> Result<Vec<Budget>>;

    /// Save a savings goal (create or replace).
    async fn save_goal(&self, goal: &SavingsGoal) -> Result<()>;

    /// List the savings goals owned by `owner`.
    async fn list_goals(&self, owner: UserId) -> Result<Vec<SavingsGoal>>;

    // === Health ===

    /// Check that the backend is reachable.
    async fn health_check(&self) -> bool;
}
