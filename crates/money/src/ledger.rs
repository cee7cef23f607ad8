//! Money ledger service.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info};
use tracker_core::{
    Budget, NewBudget, NewGoal, NewTransaction, SavingsGoal, Transaction, TransactionId, UserId,
};
use tracker_storage::{KeyedLocks, Storage};

use crate::error::{MoneyError, Result};

/// Everything the ledger holds for one user.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    /// Transactions, most recent date first
    pub transactions: Vec<Transaction>,
    /// Budgets, oldest first
    pub budgets: Vec<Budget>,
    /// Savings goals, oldest first
    pub goals: Vec<SavingsGoal>,
}

/// Personal finance ledger.
///
/// Expenses are counted against the caller's budget for the same category,
/// if one exists. Records owned by another user behave as absent.
#[async_trait]
pub trait MoneyLedger: Send + Sync {
    /// All transactions, budgets and goals of `owner`.
    async fn overview(&self, owner: UserId) -> Result<Overview>;

    /// Record a transaction.
    async fn add_transaction(&self, owner: UserId, input: NewTransaction) -> Result<Transaction>;

    /// Remove a transaction, returning what was removed.
    async fn delete_transaction(&self, owner: UserId, id: TransactionId) -> Result<Transaction>;

    /// Create a category budget.
    async fn create_budget(&self, owner: UserId, input: NewBudget) -> Result<Budget>;

    /// Create a savings goal.
    async fn create_goal(&self, owner: UserId, input: NewGoal) -> Result<SavingsGoal>;
}

/// Money ledger backed by a [`Storage`].
///
/// A transaction and the budget it affects are two documents, so every
/// write for a user runs under that user's lock. The transaction is written
/// first; if the budget write then fails, the transaction write is undone
/// before the error is returned.
pub struct BasicMoneyLedger {
    storage: Arc<dyn Storage>,
    locks: KeyedLocks<UserId>,
}

impl BasicMoneyLedger {
    /// Create a new ledger.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            locks: KeyedLocks::new(),
        }
    }

    /// The budget an expense in `category` counts against: the oldest one.
    async fn budget_for(&self, owner: UserId, category: &str) -> Result<Option<Budget>> {
        let budget = self
            .storage
            .list_budgets(owner)
            .await?
            .into_iter()
            .filter(|b| b.category == category)
            .min_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(budget)
    }
}

#[async_trait]
impl MoneyLedger for BasicMoneyLedger {
    async fn overview(&self, owner: UserId) -> Result<Overview> {
        let mut transactions = self.storage.list_transactions(owner).await?;
        transactions.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let mut budgets = self.storage.list_budgets(owner).await?;
        budgets.sort_by_key(|b| (b.created_at, b.id));

        let mut goals = self.storage.list_goals(owner).await?;
        goals.sort_by_key(|g| (g.created_at, g.id));

        debug!(
            user = %owner,
            transactions = transactions.len(),
            budgets = budgets.len(),
            goals = goals.len(),
            "Loaded money overview"
        );

        Ok(Overview {
            transactions,
            budgets,
            goals,
        })
    }

    async fn add_transaction(&self, owner: UserId, input: NewTransaction) -> Result<Transaction> {
        let transaction = Transaction::new(owner, input)?;

        let _guard = self.locks.lock(owner).await;
        let budget = if transaction.is_expense() {
            self.budget_for(owner, &transaction.category).await?
        } else {
            None
        };

        self.storage.save_transaction(&transaction).await?;

        if let Some(mut budget) = budget {
            budget.record_expense(transaction.amount);
            if let Err(e) = self.storage.save_budget(&budget).await {
                // Undo the transaction so a retry does not record it twice
                if let Err(undo) = self.storage.delete_transaction(transaction.id).await {
                    error!(
                        transaction = %transaction.id,
                        budget = %budget.id,
                        error = %undo,
                        "Failed to roll back transaction after budget write failed"
                    );
                }
                return Err(e.into());
            }
            debug!(budget = %budget.id, spent = budget.spent, "Budget spent increased");
        }

        info!(
            transaction = %transaction.id,
            user = %owner,
            kind = ?transaction.kind,
            amount = transaction.amount,
            "Transaction recorded"
        );
        Ok(transaction)
    }

    async fn delete_transaction(&self, owner: UserId, id: TransactionId) -> Result<Transaction> {
        let _guard = self.locks.lock(owner).await;

        let transaction = match self.storage.load_transaction(id).await? {
            Some(t) if t.user_id == owner => t,
            _ => return Err(MoneyError::NotFound(id)),
        };
        let budget = if transaction.is_expense() {
            self.budget_for(owner, &transaction.category).await?
        } else {
            None
        };

        self.storage.delete_transaction(id).await?;

        if let Some(mut budget) = budget {
            budget.revert_expense(transaction.amount);
            if let Err(e) = self.storage.save_budget(&budget).await {
                // Put the transaction back so the delete can be retried
                if let Err(undo) = self.storage.save_transaction(&transaction).await {
                    error!(
                        transaction = %id,
                        budget = %budget.id,
                        error = %undo,
                        "Failed to restore transaction after budget write failed"
                    );
                }
                return Err(e.into());
            }
            debug!(budget = %budget.id, spent = budget.spent, "Budget spent decreased");
        }

        info!(transaction = %id, user = %owner, "Transaction deleted");
        Ok(transaction)
    }

    async fn create_budget(&self, owner: UserId, input: NewBudget) -> Result<Budget> {
        let budget = Budget::new(owner, input)?;

        let _guard = self.locks.lock(owner).await;
        self.storage.save_budget(&budget).await?;

        info!(
            budget = %budget.id,
            category = %budget.category,
            limit = budget.limit,
            "Budget created"
        );
        Ok(budget)
    }

    async fn create_goal(&self, owner: UserId, input: NewGoal) -> Result<SavingsGoal> {
        let goal = SavingsGoal::new(owner, input)?;
        self.storage.save_goal(&goal).await?;

        info!(goal = %goal.id, name = %goal.name, target = goal.target, "Savings goal created");
        Ok(goal)
    }
}
