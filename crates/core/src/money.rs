//! Money models - transactions, category budgets and savings goals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{required, CoreError};
use crate::id::{BudgetId, GoalId, TransactionId, UserId};
use crate::Time;

/// A single income or expense entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,
    /// Owner
    pub user_id: UserId,
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Amount, always non-negative
    pub amount: f64,
    /// Spending/earning category
    pub category: String,
    /// Free text
    pub description: String,
    /// Calendar date of the transaction
    pub date: NaiveDate,
    /// Account label (cash, card, ...)
    pub account: Option<String>,
    /// Whether it repeats
    pub recurring: bool,
    /// When created
    pub created_at: Time,
    /// Last updated
    pub updated_at: Time,
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money in
    Income,
    /// Money out
    Expense,
}

/// Input for recording a transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Amount
    pub amount: f64,
    /// Category (required)
    pub category: String,
    /// Free text
    #[serde(default)]
    pub description: String,
    /// Calendar date
    pub date: NaiveDate,
    /// Account label
    #[serde(default)]
    pub account: Option<String>,
    /// Repeats
    #[serde(default)]
    pub recurring: bool,
}

/// Spending limit for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// Unique identifier
    pub id: BudgetId,
    /// Owner
    pub user_id: UserId,
    /// Category the limit applies to
    pub category: String,
    /// Spending limit
    pub limit: f64,
    /// Period the limit covers
    pub period: BudgetPeriod,
    /// Total of expenses recorded against this budget
    pub spent: f64,
    /// When created
    pub created_at: Time,
    /// Last updated
    pub updated_at: Time,
}

/// Budget period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Weekly
    Weekly,
    /// Monthly
    #[default]
    Monthly,
    /// Yearly
    Yearly,
}

/// Input for creating a budget.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    /// Category (required)
    pub category: String,
    /// Spending limit
    pub limit: f64,
    /// Period, defaults to monthly
    #[serde(default)]
    pub period: Option<BudgetPeriod>,
}

/// A savings target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    /// Unique identifier
    pub id: GoalId,
    /// Owner
    pub user_id: UserId,
    /// Goal name
    pub name: String,
    /// Amount to reach
    pub target: f64,
    /// Amount saved so far
    pub current: f64,
    /// Optional deadline
    pub deadline: Option<NaiveDate>,
    /// Priority
    pub priority: Priority,
    /// When created
    pub created_at: Time,
    /// Last updated
    pub updated_at: Time,
}

/// Savings goal priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low
    Low,
    /// Medium
    #[default]
    Medium,
    /// High
    High,
}

/// Input for creating a savings goal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    /// Name (required)
    pub name: String,
    /// Amount to reach
    pub target: f64,
    /// Optional deadline
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    /// Priority, defaults to medium
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl Transaction {
    /// Validate input and build a transaction.
    pub fn new(user_id: UserId, input: NewTransaction) -> Result<Self, CoreError> {
        let category = required("category", &input.category)?;
        let amount = non_negative("amount", input.amount)?;
        let now = chrono::Utc::now();

        Ok(Self {
            id: TransactionId::new(),
            user_id,
            kind: input.kind,
            amount,
            category,
            description: input.description,
            date: input.date,
            account: input.account,
            recurring: input.recurring,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether this transaction counts against budgets.
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

impl Budget {
    /// Validate input and build a budget with nothing spent.
    pub fn new(user_id: UserId, input: NewBudget) -> Result<Self, CoreError> {
        let category = required("category", &input.category)?;
        let limit = non_negative("limit", input.limit)?;
        let now = chrono::Utc::now();

        Ok(Self {
            id: BudgetId::new(),
            user_id,
            category,
            limit,
            period: input.period.unwrap_or_default(),
            spent: 0.0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Add an expense to the spent total.
    pub fn record_expense(&mut self, amount: f64) {
        self.spent += amount;
        self.updated_at = chrono::Utc::now();
    }

    /// Remove an expense from the spent total, never going below zero.
    pub fn revert_expense(&mut self, amount: f64) {
        self.spent = (self.spent - amount).max(0.0);
        self.updated_at = chrono::Utc::now();
    }

    /// Amount left before the limit is reached (negative when over).
    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }
}

impl SavingsGoal {
    /// Validate input and build a goal with nothing saved.
    pub fn new(user_id: UserId, input: NewGoal) -> Result<Self, CoreError> {
        let name = required("name", &input.name)?;
        let target = non_negative("target", input.target)?;
        let now = chrono::Utc::now();

        Ok(Self {
            id: GoalId::new(),
            user_id,
            name,
            target,
            current: 0.0,
            deadline: input.deadline,
            priority: input.priority.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::InvalidAmount { field, value });
    }
    Ok(value)
}
