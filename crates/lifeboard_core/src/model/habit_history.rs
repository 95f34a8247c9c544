//! Sparse habit completion history.
//!
//! # Invariants
//! - Only completed days are stored; toggling a completed day removes it.
//! - A habit with no completed days has no entry at all.

use crate::model::record::DATE_FORMAT;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat `(habitId, date, completed)` projection used by the remote tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDayRow {
    pub habit_id: String,
    pub date: String,
    pub completed: bool,
}

/// habit id -> `YYYY-MM-DD` -> completed marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitHistory(BTreeMap<String, BTreeMap<String, bool>>);

impl HabitHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the marker for one day and returns the new state.
    pub fn toggle(&mut self, habit_id: &str, date: &str) -> bool {
        let days = self.0.entry(habit_id.to_string()).or_default();
        if days.remove(date).is_some() {
            if days.is_empty() {
                self.0.remove(habit_id);
            }
            return false;
        }
        days.insert(date.to_string(), true);
        true
    }

    pub fn is_done(&self, habit_id: &str, date: &str) -> bool {
        self.0
            .get(habit_id)
            .and_then(|days| days.get(date))
            .copied()
            .unwrap_or(false)
    }

    /// Completed days for one habit, ascending.
    pub fn days(&self, habit_id: &str) -> Vec<&str> {
        self.0
            .get(habit_id)
            .map(|days| {
                days.iter()
                    .filter(|(_, done)| **done)
                    .map(|(date, _)| date.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drops every entry of `habit_id`; returns whether anything was removed.
    pub fn remove_habit(&mut self, habit_id: &str) -> bool {
        self.0.remove(habit_id).is_some()
    }

    /// Drops histories whose habit is not in `habit_ids`; returns how many.
    pub fn retain_habits<'a>(&mut self, habit_ids: impl IntoIterator<Item = &'a str>) -> usize {
        let keep = habit_ids.into_iter().collect::<std::collections::BTreeSet<_>>();
        let before = self.0.len();
        self.0.retain(|habit_id, _| keep.contains(habit_id.as_str()));
        before - self.0.len()
    }

    pub fn habit_count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consecutive completed days ending at `today`.
    ///
    /// An unmarked `today` does not break the streak; counting then starts
    /// from yesterday.
    pub fn streak(&self, habit_id: &str, today: NaiveDate) -> u32 {
        let mut cursor = if self.is_done(habit_id, &format_day(today)) {
            today
        } else {
            match today.checked_sub_days(Days::new(1)) {
                Some(day) => day,
                None => return 0,
            }
        };

        let mut streak = 0;
        while self.is_done(habit_id, &format_day(cursor)) {
            streak += 1;
            match cursor.checked_sub_days(Days::new(1)) {
                Some(day) => cursor = day,
                None => break,
            }
        }
        streak
    }

    /// Flattens into one row per stored day.
    pub fn to_rows(&self) -> Vec<HabitDayRow> {
        self.0
            .iter()
            .flat_map(|(habit_id, days)| {
                days.iter().map(move |(date, completed)| HabitDayRow {
                    habit_id: habit_id.clone(),
                    date: date.clone(),
                    completed: *completed,
                })
            })
            .collect()
    }

    /// Re-nests flat rows; rows with `completed=false` or blank keys are dropped.
    pub fn from_rows(rows: impl IntoIterator<Item = HabitDayRow>) -> Self {
        let mut history = Self::new();
        for row in rows {
            if !row.completed || row.habit_id.trim().is_empty() || row.date.trim().is_empty() {
                continue;
            }
            history
                .0
                .entry(row.habit_id)
                .or_default()
                .insert(row.date, true);
        }
        history
    }
}

fn format_day(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}
