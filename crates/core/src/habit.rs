//! Habit model - a recurring activity with weekly and monthly completion marks.
//!
//! A habit carries two independent tracks of completion state:
//!
//! - the *today* track: `completed_today`, the streak counters and the
//!   7-slot `week_progress` array, changed only by [`Habit::toggle_today`];
//! - the *calendar* track: `progress`, one boolean array per month, changed
//!   only by [`Habit::set_month_day`].
//!
//! Neither track is ever re-derived from the other. Marking today's cell on
//! the monthly sheet does not touch the streak, and toggling today does not
//! touch the monthly sheet.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{required, CoreError};
use crate::id::{HabitId, UserId};
use crate::month::MonthKey;
use crate::Time;

/// Number of slots in the weekly progress array.
pub const DAYS_PER_WEEK: usize = 7;

/// Category assigned when the creator does not pick one.
pub const DEFAULT_CATEGORY: &str = "health";

/// A user-defined recurring activity tracked daily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Unique identifier
    pub id: HabitId,

    /// Owner
    pub user_id: UserId,

    /// Display name
    pub name: String,

    /// Free-form category (health, fitness, learning, ...)
    pub category: String,

    /// Perceived difficulty
    pub difficulty: Difficulty,

    /// Owner notes
    pub notes: String,

    /// Whether today's slot is marked done
    pub completed_today: bool,

    /// Consecutive completed days ending today (or yesterday)
    pub streak: u32,

    /// Highest value `streak` has ever reached
    pub best_streak: u32,

    /// Completion marks indexed by weekday, 0 = Sunday ... 6 = Saturday
    pub week_progress: [bool; DAYS_PER_WEEK],

    /// Completion marks per month; months never written are absent
    pub progress: BTreeMap<MonthKey, Vec<bool>>,

    /// When created
    pub created_at: Time,

    /// Last updated
    pub updated_at: Time,
}

/// How hard a habit is to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Easy
    Easy,
    /// Medium
    #[default]
    Medium,
    /// Hard
    Hard,
}

/// Input for creating a habit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    /// Display name (required)
    pub name: String,
    /// Category, defaults to `health`
    #[serde(default)]
    pub category: Option<String>,
    /// Difficulty, defaults to `medium`
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Notes, defaults to empty
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of a habit's descriptive fields.
///
/// Derived fields (completion, streaks, progress) are not patchable:
/// they change only through the progress transitions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    /// New name
    #[serde(default)]
    pub name: Option<String>,
    /// New category
    #[serde(default)]
    pub category: Option<String>,
    /// New difficulty
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// New notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// Arguments for marking one day of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthDayMark {
    /// Target month
    pub month: MonthKey,
    /// 0-based day within the month
    pub day_index: usize,
    /// Desired mark
    pub value: bool,
    /// Length used if the month array has to be created
    pub days_in_month: usize,
}

/// Weekday slot of `date` in [`Habit::week_progress`] (0 = Sunday).
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

impl Habit {
    /// Create a habit with every derived field at its default.
    pub fn new(user_id: UserId, input: NewHabit) -> Result<Self, CoreError> {
        let name = required("name", &input.name)?;
        let now = chrono::Utc::now();

        Ok(Self {
            id: HabitId::new(),
            user_id,
            name,
            category: category_or_default(input.category.as_deref().unwrap_or_default()),
            difficulty: input.difficulty.unwrap_or_default(),
            notes: input.notes.unwrap_or_default(),
            completed_today: false,
            streak: 0,
            best_streak: 0,
            week_progress: [false; DAYS_PER_WEEK],
            progress: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether `user` owns this habit.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.user_id == user
    }

    /// Apply a descriptive patch. Nothing changes if validation fails.
    pub fn apply_patch(&mut self, patch: HabitPatch) -> Result<(), CoreError> {
        let name = patch.name.as_deref().map(|n| required("name", n)).transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category_or_default(&category);
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        Ok(())
    }

    /// Flip today's completion and adjust the streak counters.
    ///
    /// Completing today increments `streak` and raises `best_streak` to it if
    /// needed. Un-completing decrements `streak` (floored at 0) and leaves
    /// `best_streak` alone, so a complete/un-complete pair restores `streak`
    /// but can leave `best_streak` permanently higher. Returns the new value
    /// of `completed_today`.
    pub fn toggle_today(&mut self, today: NaiveDate) -> bool {
        let slot = weekday_index(today);
        let completed = !self.completed_today;

        self.completed_today = completed;
        self.week_progress[slot] = completed;

        if completed {
            self.streak = self.streak.saturating_add(1);
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = self.streak.saturating_sub(1);
        }

        completed
    }

    /// Set one day of a month on the monthly sheet.
    ///
    /// A month seen for the first time gets an all-false array of
    /// `days_in_month` entries. Existing arrays keep the length they were
    /// created with. The today track is never touched.
    pub fn set_month_day(&mut self, mark: MonthDayMark) -> Result<(), CoreError> {
        if !(28..=31).contains(&mark.days_in_month) {
            return Err(CoreError::InvalidMonthLength(mark.days_in_month));
        }

        let len = self
            .progress
            .get(&mark.month)
            .map_or(mark.days_in_month, Vec::len);
        if mark.day_index >= len || mark.day_index >= mark.days_in_month {
            return Err(CoreError::DayOutOfRange {
                index: mark.day_index,
                len: len.min(mark.days_in_month),
            });
        }

        let days = self
            .progress
            .entry(mark.month)
            .or_insert_with(|| vec![false; mark.days_in_month]);
        days[mark.day_index] = mark.value;
        Ok(())
    }

    /// Marks recorded for `month`, if that month was ever written.
    pub fn month_progress(&self, month: &MonthKey) -> Option<&[bool]> {
        self.progress.get(month).map(Vec::as_slice)
    }
}

fn category_or_default(category: &str) -> String {
    match category.trim() {
        "" => DEFAULT_CATEGORY.to_string(),
        trimmed => trimmed.to_string(),
    }
}
