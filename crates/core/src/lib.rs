//! Ultimate Tracker core data models.
//!
//! This crate defines the records the tracker persists (habits and money
//! entries) and the pure state transitions on them. It does no I/O.

#![warn(missing_docs)]

// Core identities
mod id;
mod error;

// Habits
mod month;
mod habit;

// Money
mod money;

// Re-exports
pub use id::*;
pub use error::CoreError;

pub use month::MonthKey;
pub use habit::{
    weekday_index, Difficulty, Habit, HabitPatch, MonthDayMark, NewHabit, DAYS_PER_WEEK,
    DEFAULT_CATEGORY,
};

pub use money::{
    Budget, BudgetPeriod, NewBudget, NewGoal, NewTransaction, Priority, SavingsGoal,
    Transaction, TransactionKind,
};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
