//! In-memory collection state owned by the store.

use crate::model::collection::CollectionKind;
use crate::model::habit_history::HabitHistory;
use crate::model::record::CollectionRecord;
use crate::model::records::{
    Alarm, BucketItem, CallReminder, Expense, Habit, JournalEntry, Meal, Movie, Note, Quote, Task,
    VisionItem,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Every collection the store holds, one typed vector each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub tasks: Vec<Task>,
    pub expenses: Vec<Expense>,
    pub notes: Vec<Note>,
    pub habits: Vec<Habit>,
    pub habit_history: HabitHistory,
    pub meals: Vec<Meal>,
    pub call_reminders: Vec<CallReminder>,
    pub completed_call_reminders: Vec<CallReminder>,
    pub bucket_list: Vec<BucketItem>,
    pub vision_board: Vec<VisionItem>,
    pub journal_entries: Vec<JournalEntry>,
    pub quotes: Vec<Quote>,
    pub alarms: Vec<Alarm>,
    pub movies: Vec<Movie>,
}

impl Collections {
    /// Serializes one collection to the JSON document stored under its key.
    pub fn to_document(&self, kind: CollectionKind) -> serde_json::Result<Value> {
        match kind {
            CollectionKind::Tasks => serde_json::to_value(&self.tasks),
            CollectionKind::Expenses => serde_json::to_value(&self.expenses),
            CollectionKind::Notes => serde_json::to_value(&self.notes),
            CollectionKind::Habits => serde_json::to_value(&self.habits),
            CollectionKind::HabitHistory => serde_json::to_value(&self.habit_history),
            CollectionKind::Meals => serde_json::to_value(&self.meals),
            CollectionKind::CallReminders => serde_json::to_value(&self.call_reminders),
            CollectionKind::CompletedCallReminders => {
                serde_json::to_value(&self.completed_call_reminders)
            }
            CollectionKind::BucketList => serde_json::to_value(&self.bucket_list),
            CollectionKind::VisionBoard => serde_json::to_value(&self.vision_board),
            CollectionKind::JournalEntries => serde_json::to_value(&self.journal_entries),
            CollectionKind::Quotes => serde_json::to_value(&self.quotes),
            CollectionKind::Alarms => serde_json::to_value(&self.alarms),
            CollectionKind::Movies => serde_json::to_value(&self.movies),
        }
    }

    /// Replaces one collection wholesale from its stored JSON document.
    pub fn load_document(
        &mut self,
        kind: CollectionKind,
        document: Value,
    ) -> serde_json::Result<()> {
        match kind {
            CollectionKind::Tasks => replace(&mut self.tasks, document),
            CollectionKind::Expenses => replace(&mut self.expenses, document),
            CollectionKind::Notes => replace(&mut self.notes, document),
            CollectionKind::Habits => replace(&mut self.habits, document),
            CollectionKind::HabitHistory => {
                self.habit_history = serde_json::from_value(document)?;
                Ok(())
            }
            CollectionKind::Meals => replace(&mut self.meals, document),
            CollectionKind::CallReminders => replace(&mut self.call_reminders, document),
            CollectionKind::CompletedCallReminders => {
                replace(&mut self.completed_call_reminders, document)
            }
            CollectionKind::BucketList => replace(&mut self.bucket_list, document),
            CollectionKind::VisionBoard => replace(&mut self.vision_board, document),
            CollectionKind::JournalEntries => replace(&mut self.journal_entries, document),
            CollectionKind::Quotes => replace(&mut self.quotes, document),
            CollectionKind::Alarms => replace(&mut self.alarms, document),
            CollectionKind::Movies => replace(&mut self.movies, document),
        }
    }

    /// Number of records (or habits with history) in one collection.
    pub fn len(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Tasks => self.tasks.len(),
            CollectionKind::Expenses => self.expenses.len(),
            CollectionKind::Notes => self.notes.len(),
            CollectionKind::Habits => self.habits.len(),
            CollectionKind::HabitHistory => self.habit_history.habit_count(),
            CollectionKind::Meals => self.meals.len(),
            CollectionKind::CallReminders => self.call_reminders.len(),
            CollectionKind::CompletedCallReminders => self.completed_call_reminders.len(),
            CollectionKind::BucketList => self.bucket_list.len(),
            CollectionKind::VisionBoard => self.vision_board.len(),
            CollectionKind::JournalEntries => self.journal_entries.len(),
            CollectionKind::Quotes => self.quotes.len(),
            CollectionKind::Alarms => self.alarms.len(),
            CollectionKind::Movies => self.movies.len(),
        }
    }

    /// Drops records of `kind` that fail validation; returns how many.
    pub fn drop_invalid(&mut self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Tasks => retain_valid(&mut self.tasks),
            CollectionKind::Expenses => retain_valid(&mut self.expenses),
            CollectionKind::Notes => retain_valid(&mut self.notes),
            CollectionKind::Habits => retain_valid(&mut self.habits),
            CollectionKind::HabitHistory => 0,
            CollectionKind::Meals => retain_valid(&mut self.meals),
            CollectionKind::CallReminders => retain_valid(&mut self.call_reminders),
            CollectionKind::CompletedCallReminders => {
                retain_valid(&mut self.completed_call_reminders)
            }
            CollectionKind::BucketList => retain_valid(&mut self.bucket_list),
            CollectionKind::VisionBoard => retain_valid(&mut self.vision_board),
            CollectionKind::JournalEntries => retain_valid(&mut self.journal_entries),
            CollectionKind::Quotes => retain_valid(&mut self.quotes),
            CollectionKind::Alarms => retain_valid(&mut self.alarms),
            CollectionKind::Movies => retain_valid(&mut self.movies),
        }
    }

    /// Drops history entries whose habit is gone; returns how many habits.
    pub fn drop_orphan_history(&mut self) -> usize {
        let habits = &self.habits;
        self.habit_history
            .retain_habits(habits.iter().map(|habit| habit.id.as_str()))
    }
}

fn retain_valid<T: CollectionRecord>(slot: &mut Vec<T>) -> usize {
    let before = slot.len();
    slot.retain(|record| record.validate().is_ok());
    before - slot.len()
}

fn replace<T: Serialize + DeserializeOwned>(
    slot: &mut Vec<T>,
    document: Value,
) -> serde_json::Result<()> {
    *slot = match document {
        Value::Null => Vec::new(),
        other => serde_json::from_value(other)?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Collections;
    use crate::model::collection::CollectionKind;
    use crate::model::records::{Habit, Task};
    use serde_json::json;

    #[test]
    fn drop_invalid_and_orphans() {
        let mut collections = Collections::default();
        collections.tasks.push(Task::new("ok", Some("2024-01-01")));
        collections.tasks.push(Task::new("bad", Some("2024-13-40")));
        let mut habit = Habit::new("read");
        habit.id = "h1".to_string();
        collections.habits.push(habit);
        collections.habit_history.toggle("h1", "2024-01-01");
        collections.habit_history.toggle("ghost", "2024-01-01");

        assert_eq!(collections.drop_invalid(CollectionKind::Tasks), 1);
        assert_eq!(collections.tasks[0].text, "ok");
        assert_eq!(collections.drop_orphan_history(), 1);
        assert!(collections.habit_history.is_done("h1", "2024-01-01"));
        assert!(!collections.habit_history.is_done("ghost", "2024-01-01"));
    }

    #[test]
    fn document_round_trip_preserves_records() {
        let mut collections = Collections::default();
        collections.tasks.push(Task::new("Buy milk", Some("2024-01-01")));
        collections.habit_history.toggle("h1", "2024-01-01");

        let mut restored = Collections::default();
        for kind in CollectionKind::ALL {
            let document = collections.to_document(kind).unwrap();
            restored.load_document(kind, document).unwrap();
        }
        assert_eq!(restored, collections);
    }

    #[test]
    fn null_document_clears_collection() {
        let mut collections = Collections::default();
        collections.tasks.push(Task::new("x", None));
        collections
            .load_document(CollectionKind::Tasks, json!(null))
            .unwrap();
        assert_eq!(collections.len(CollectionKind::Tasks), 0);
    }
}
