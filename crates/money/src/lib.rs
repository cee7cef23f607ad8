//! Personal finance ledger: transactions, category budgets and savings goals.

#![warn(missing_docs)]

pub mod error;
pub mod ledger;

pub use error::{MoneyError, Result};
pub use ledger::{BasicMoneyLedger, MoneyLedger, Overview};
