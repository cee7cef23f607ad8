//! Habit progress tracking.
//!
//! Owns the lifecycle of a habit's completion state: the today flag with
//! its streak counters, the weekly slots and the monthly sheet.

#![warn(missing_docs)]

pub mod error;
pub mod tracker;

pub use error::{Result, TrackerError};
pub use tracker::{BasicHabitTracker, HabitTracker};
