//! JSON file storage implementation.
//!
//! Stores one pretty-printed JSON document per record under a data
//! directory:
//!
//! ```text
//! <root>/habits/<id>.json
//! <root>/transactions/<id>.json
//! <root>/budgets/<id>.json
//! <root>/goals/<id>.json
//! ```
//!
//! Writes go to a sibling `.tmp` file that is then renamed over the target,
//! so a crash mid-write leaves the previous document in place.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};
use tracker_core::{
    Budget, Habit, HabitId, SavingsGoal, Transaction, TransactionId, UserId,
};

use super::{Result, Storage};

const HABITS: &str = "habits";
const TRANSACTIONS: &str = "transactions";
const BUDGETS: &str = "budgets";
const GOALS: &str = "goals";

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage rooted at `root`, creating the collection directories.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        for collection in [HABITS, TRANSACTIONS, BUDGETS, GOALS] {
            fs::create_dir_all(root.join(collection)).await?;
        }

        debug!(root = %root.display(), "JSON storage ready");
        Ok(Self { root })
    }

    fn document_path(&self, collection: &str, id: impl std::fmt::Display) -> PathBuf {
        self.root.join(collection).join(format!("{}.json", id))
    }

    async fn list_owned<T, F>(&self, collection: &str, owned: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let all: Vec<T> = list_dir(&self.root.join(collection)).await?;
        Ok(all.into_iter().filter(|item| owned(item)).collect())
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_habit(&self, habit: &Habit) -> Result<()> {
        write_json(&self.document_path(HABITS, habit.id), habit).await
    }

    async fn load_habit(&self, id: HabitId) -> Result<Option<Habit>> {
        read_json(&self.document_path(HABITS, id)).await
    }

    async fn list_habits(&self, owner: UserId) -> Result<Vec<Habit>> {
        self.list_owned(HABITS, |h: &Habit| h.user_id == owner).await
    }

    async fn delete_habit(&self, id: HabitId) -> Result<()> {
        remove_file(&self.document_path(HABITS, id)).await
    }

    async fn save_transaction(&self, transaction: &Transaction) -> Result<()> {
        write_json(&self.document_path(TRANSACTIONS, transaction.id), transaction).await
    }

    async fn load_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        read_json(&self.document_path(TRANSACTIONS, id)).await
    }

    async fn list_transactions(&self, owner: UserId) -> Result<Vec<Transaction>> {
        self.list_owned(TRANSACTIONS, |t: &Transaction| t.user_id == owner).await
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<()> {
        remove_file(&self.document_path(TRANSACTIONS, id)).await
    }

    async fn save_budget(&self, budget: &Budget) -> Result<()> {
        write_json(&self.document_path(BUDGETS, budget.id), budget).await
    }

    async fn list_budgets(&self, owner: UserId) -> Result<Vec<Budget>> {
        self.list_owned(BUDGETS, |b: &Budget| b.user_id == owner).await
    }

    async fn save_goal(&self, goal: &SavingsGoal) -> Result<()> {
        write_json(&self.document_path(GOALS, goal.id), goal).await
    }

    async fn list_goals(&self, owner: UserId) -> Result<Vec<SavingsGoal>> {
        self.list_owned(GOALS, |g: &SavingsGoal| g.user_id == owner).await
    }

    async fn health_check(&self) -> bool {
        fs::metadata(self.root.join(HABITS))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");

    fs::write(&tmp, json.as_bytes()).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).await.or_else(|e| {
        if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
    })?;
    Ok(())
}

async fn list_dir<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&path).await {
            Ok(Some(item)) => items.push(item),
            // Removed between read_dir and read
            Ok(None) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable document"),
        }
    }
    Ok(items)
}
