//! SQLite storage backend.
//!
//! Keeps the document model of [`crate::JsonStorage`]: every record is one
//! JSON document in a single `documents` table, keyed by id and indexed by
//! collection and owner.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Row;
use std::path::Path;
use tracing::warn;
use tracker_core::{
    Budget, Habit, HabitId, SavingsGoal, Transaction, TransactionId, UserId,
};

use super::trait_::{Result, Storage, StorageError};

const HABIT: &str = "habit";
const TRANSACTION: &str = "transaction";
const BUDGET: &str = "budget";
const GOAL: &str = "goal";

/// SQLite storage implementation.
#[derive(Clone)]
pub struct SqliteStorage {
    /// Database connection pool
    pool: sqlx::SqlitePool,
}

impl SqliteStorage {
    /// Open (creating if needed) a database file.
    pub async fn new(db_path: &str) -> Result<Self> {
        let url = format!("sqlite://{}?mode=rwc", db_path);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .map_err(db_error)?;

        let storage = Self { pool };
        storage.init_schema().await?;

        Ok(storage)
    }

    /// Open a database file from a path.
    pub async fn new_from_path(path: &Path) -> Result<Self> {
        let path = path
            .to_str()
            .ok_or_else(|| StorageError::Other(format!("Non UTF-8 path: {}", path.display())))?;
        Self::new(path).await
    }

    /// Create an in-memory SQLite storage for testing.
    pub async fn in_memory() -> Result<Self> {
        // A single connection, since every :memory: connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(db_error)?;

        let storage = Self { pool };
        storage.init_schema().await?;

        Ok(storage)
    }

    /// Initialize the database schema.
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                owner TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_owner ON documents(kind, owner)")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(())
    }

    async fn put<T: Serialize + Sync>(
        &self,
        kind: &str,
        id: String,
        owner: UserId,
        value: &T,
    ) -> Result<()> {
        let data = serde_json::to_string(value)?;

        sqlx::query(
            "INSERT OR REPLACE INTO documents (id, kind, owner, data, updated_at)
            VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(kind)
        .bind(owner.to_string())
        .bind(data)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, kind: &str, id: String) -> Result<Option<T>> {
        let row = sqlx::query("SELECT data FROM documents WHERE id = ? AND kind = ?")
            .bind(id)
            .bind(kind)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        match row {
            Some(row) => {
                let data: String = row.try_get("data").map_err(db_error)?;
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    async fn list<T: DeserializeOwned>(&self, kind: &str, owner: UserId) -> Result<Vec<T>> {
        let rows = sqlx::query("SELECT id, data FROM documents WHERE kind = ? AND owner = ?")
            .bind(kind)
            .bind(owner.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id").map_err(db_error)?;
            let data: String = row.try_get("data").map_err(db_error)?;
            match serde_json::from_str(&data) {
                Ok(item) => items.push(item),
                Err(e) => warn!(kind, id = %id, error = %e, "Skipping unreadable document"),
            }
        }
        Ok(items)
    }

    async fn remove(&self, kind: &str, id: String) -> Result<()> {
        sqlx::query("DELETE FROM documents WHERE id = ? AND kind = ?")
            .bind(id)
            .bind(kind)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn save_habit(&self, habit: &Habit) -> Result<()> {
        self.put(HABIT, habit.id.to_string(), habit.user_id, habit).await
    }

    async fn load_habit(&self, id: HabitId) -> Result<Option<Habit>> {
        self.get(HABIT, id.to_string()).await
    }

    async fn list_habits(&self, owner: UserId) -> Result<Vec<Habit>> {
        self.list(HABIT, owner).await
    }

    async fn delete_habit(&self, id: HabitId) -> Result<()> {
        self.remove(HABIT, id.to_string()).await
    }

    async fn save_transaction(&self, transaction: &Transaction) -> Result<()> {
        self.put(TRANSACTION, transaction.id.to_string(), transaction.user_id, transaction)
            .await
    }

    async fn load_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        self.get(TRANSACTION, id.to_string()).await
    }

    async fn list_transactions(&self, owner: UserId) -> Result<Vec<Transaction>> {
        self.list(TRANSACTION, owner).await
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<()> {
        self.remove(TRANSACTION, id.to_string()).await
    }

    async fn save_budget(&self, budget: &Budget) -> Result<()> {
        self.put(BUDGET, budget.id.to_string(), budget.user_id, budget).await
    }

    async fn list_budgets(&self, owner: UserId) -> Result<Vec<Budget>> {
        self.list(BUDGET, owner).await
    }

    async fn save_goal(&self, goal: &SavingsGoal) -> Result<()> {
        self.put(GOAL, goal.id.to_string(), goal.user_id, goal).await
    }

    async fn list_goals(&self, owner: UserId) -> Result<Vec<SavingsGoal>> {
        self.list(GOAL, owner).await
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}

fn db_error(e: sqlx::Error) -> StorageError {
    StorageError::Database(e.to_string())
}
