//! Habit tracking service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use tracker_core::{
    weekday_index, CoreError, Habit, HabitId, HabitPatch, MonthDayMark, NewHabit, UserId,
};
use tracker_storage::{KeyedLocks, Storage};

use crate::error::{Result, TrackerError};

/// Habit tracking service.
///
/// Every operation is scoped to a caller: habits owned by another user are
/// reported as [`TrackerError::NotFound`].
#[async_trait]
pub trait HabitTracker: Send + Sync {
    /// Create a habit with all derived fields at their defaults.
    async fn create_habit(&self, owner: UserId, input: NewHabit) -> Result<Habit>;

    /// List the caller's habits, newest first.
    async fn list_habits(&self, owner: UserId) -> Result<Vec<Habit>>;

    /// Get one habit.
    async fn get_habit(&self, id: HabitId, owner: UserId) -> Result<Habit>;

    /// Update descriptive fields.
    async fn update_habit(&self, id: HabitId, owner: UserId, patch: HabitPatch) -> Result<Habit>;

    /// Flip today's completion, adjusting the week slot for `today` and the
    /// streak counters.
    async fn toggle_today(&self, id: HabitId, owner: UserId, today: NaiveDate) -> Result<Habit>;

    /// Set one day on the monthly sheet. Streaks are not touched.
    async fn set_month_day(&self, id: HabitId, owner: UserId, mark: MonthDayMark) -> Result<Habit>;

    /// Delete a habit and all of its progress.
    async fn delete_habit(&self, id: HabitId, owner: UserId) -> Result<()>;
}

/// Habit tracker backed by a [`Storage`].
///
/// Mutations run as load → change → save while holding a per-habit lock,
/// so concurrent requests for the same habit cannot lose each other's
/// updates. The change is applied to a copy; if validation or the save
/// fails, the stored document is left as it was.
pub struct BasicHabitTracker {
    storage: Arc<dyn Storage>,
    locks: KeyedLocks<HabitId>,
}

impl BasicHabitTracker {
    /// Create a new habit tracker.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            locks: KeyedLocks::new(),
        }
    }

    async fn load_owned(&self, id: HabitId, owner: UserId) -> Result<Habit> {
        match self.storage.load_habit(id).await? {
            Some(habit) if habit.is_owned_by(owner) => Ok(habit),
            _ => Err(TrackerError::NotFound(id)),
        }
    }

    async fn mutate<F>(&self, id: HabitId, owner: UserId, change: F) -> Result<Habit>
    where
        F: FnOnce(&mut Habit) -> std::result::Result<(), CoreError> + Send,
    {
        let _guard = self.locks.lock(id).await;

        let mut habit = self.load_owned(id, owner).await?;
        change(&mut habit)?;
        habit.updated_at = Utc::now();
        self.storage.save_habit(&habit).await?;

        Ok(habit)
    }
}

#[async_trait]
impl HabitTracker for BasicHabitTracker {
    async fn create_habit(&self, owner: UserId, input: NewHabit) -> Result<Habit> {
        let habit = Habit::new(owner, input)?;
        self.storage.save_habit(&habit).await?;

        info!(habit = %habit.id, user = %owner, "Habit created");
        Ok(habit)
    }

    async fn list_habits(&self, owner: UserId) -> Result<Vec<Habit>> {
        let mut habits = self.storage.list_habits(owner).await?;
        habits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        debug!(user = %owner, count = habits.len(), "Listed habits");
        Ok(habits)
    }

    async fn get_habit(&self, id: HabitId, owner: UserId) -> Result<Habit> {
        self.load_owned(id, owner).await
    }

    async fn update_habit(&self, id: HabitId, owner: UserId, patch: HabitPatch) -> Result<Habit> {
        let habit = self.mutate(id, owner, |habit| habit.apply_patch(patch)).await?;

        info!(habit = %id, "Habit updated");
        Ok(habit)
    }

    async fn toggle_today(&self, id: HabitId, owner: UserId, today: NaiveDate) -> Result<Habit> {
        let habit = self
            .mutate(id, owner, |habit| {
                habit.toggle_today(today);
                Ok(())
            })
            .await?;

        info!(
            habit = %id,
            date = %today,
            slot = weekday_index(today),
            completed = habit.completed_today,
            streak = habit.streak,
            best_streak = habit.best_streak,
            "Toggled today"
        );
        Ok(habit)
    }

    async fn set_month_day(&self, id: HabitId, owner: UserId, mark: MonthDayMark) -> Result<Habit> {
        let habit = self.mutate(id, owner, |habit| habit.set_month_day(mark)).await?;

        info!(
            habit = %id,
            month = %mark.month,
            day = mark.day_index,
            value = mark.value,
            "Month day set"
        );
        Ok(habit)
    }

    async fn delete_habit(&self, id: HabitId, owner: UserId) -> Result<()> {
        let _guard = self.locks.lock(id).await;

        self.load_owned(id, owner).await?;
        self.storage.delete_habit(id).await?;

        info!(habit = %id, "Habit deleted");
        Ok(())
    }
}
