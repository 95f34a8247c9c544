//! Habit history actions.

use crate::model::collection::CollectionKind;
use crate::model::habit_history::HabitHistory;
use crate::model::record::{check_date, DATE_FORMAT};
use crate::model::records::Habit;
use crate::repo::kv_store::KeyValueStore;
use crate::service::error::{MutationOutcome, StoreResult};
use crate::service::store::LifeStore;
use crate::sync::pending::ChangeType;
use serde_json::json;

/// Result of toggling one habit day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitDayToggle {
    /// Day is now marked done.
    Marked,
    /// Day marker was removed.
    Cleared,
    HabitNotFound,
}

impl<S: KeyValueStore> LifeStore<S> {
    pub fn habit_history(&self) -> &HabitHistory {
        &self.collections.habit_history
    }

    /// Flips the completion marker of `habit_id` on `date` (`YYYY-MM-DD`).
    pub fn toggle_habit_day(&mut self, habit_id: &str, date: &str) -> StoreResult<HabitDayToggle> {
        check_date("date", date)?;
        if self.get::<Habit>(habit_id).is_none() {
            return Ok(HabitDayToggle::HabitNotFound);
        }

        let completed = self.collections.habit_history.toggle(habit_id, date);
        self.persist_collection(CollectionKind::HabitHistory)?;
        self.record_change(
            ChangeType::HabitToggle,
            CollectionKind::HabitHistory,
            json!({ "habitId": habit_id, "date": date, "completed": completed }),
        )?;

        Ok(if completed {
            HabitDayToggle::Marked
        } else {
            HabitDayToggle::Cleared
        })
    }

    /// Deletes a habit together with its history.
    pub fn delete_habit(&mut self, habit_id: &str) -> StoreResult<MutationOutcome> {
        self.delete::<Habit>(habit_id)
    }

    /// Current streak of consecutive completed days, see `HabitHistory::streak`.
    pub fn habit_streak(&self, habit_id: &str) -> u32 {
        self.collections
            .habit_history
            .streak(habit_id, self.clock.today())
    }

    /// Whether `habit_id` is marked done today.
    pub fn habit_done_today(&self, habit_id: &str) -> bool {
        let today = self.clock.today().format(DATE_FORMAT).to_string();
        self.collections.habit_history.is_done(habit_id, &today)
    }
}
