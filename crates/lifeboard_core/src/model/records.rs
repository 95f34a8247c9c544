//! Typed records for every collection.
//!
//! All records share `id`, `createdAt` and `updatedAt`; the remaining fields
//! are collection-specific. Field names are camelCase in storage and on the
//! remote sheets. Missing fields deserialize to their defaults so older
//! payloads keep loading.

use crate::model::collection::CollectionKind;
use crate::model::record::{
    check_choice, check_clock_time, check_date, check_optional_date, check_range,
    collection_record, require_text, RecordValidationError,
};
use serde::{Deserialize, Serialize};

const PRIORITIES: &[&str] = &["low", "medium", "high"];
const HABIT_FREQUENCIES: &[&str] = &["daily", "weekly", "monthly"];
const MEAL_TYPES: &[&str] = &["breakfast", "lunch", "dinner", "snack"];
const WEEKDAYS: &[&str] = &["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    pub text: String,
    /// Day the task is planned for.
    pub date: Option<String>,
    pub time: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub completed: bool,
    pub completed_date: Option<String>,
    /// Set by the daily rollover when the planned day passed unfinished.
    pub not_done: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Task {
    pub fn new(text: impl Into<String>, date: Option<&str>) -> Self {
        Self {
            text: text.into(),
            date: date.map(str::to_string),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        require_text(CollectionKind::Tasks, "text", &self.text)?;
        check_optional_date("date", self.date.as_deref())?;
        check_optional_date("completedDate", self.completed_date.as_deref())?;
        if let Some(time) = self.time.as_deref().filter(|value| !value.is_empty()) {
            check_clock_time("time", time)?;
        }
        if let Some(priority) = self.priority.as_deref() {
            check_choice("priority", priority, PRIORITIES)?;
        }
        Ok(())
    }
}

collection_record!(Task, CollectionKind::Tasks, tasks);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: String,
    pub payment_method: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Expense {
    pub fn new(amount: f64, category: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            amount,
            category: category.into(),
            date: date.into(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        check_range("amount", self.amount, 0.0, f64::MAX)?;
        require_text(CollectionKind::Expenses, "category", &self.category)?;
        check_date("date", &self.date)
    }
}

collection_record!(Expense, CollectionKind::Expenses, expenses);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub color: Option<String>,
    pub pinned: bool,
    pub tags: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        if self.title.trim().is_empty() && self.content.trim().is_empty() {
            return Err(RecordValidationError::EmptyField {
                collection: CollectionKind::Notes,
                field: "content",
            });
        }
        Ok(())
    }
}

collection_record!(Note, CollectionKind::Notes, notes);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub frequency: String,
    /// Completions per frequency window.
    pub target: u32,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Default for Habit {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            frequency: "daily".to_string(),
            target: 1,
            color: None,
            icon: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Habit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        require_text(CollectionKind::Habits, "name", &self.name)?;
        check_choice("frequency", &self.frequency, HABIT_FREQUENCIES)?;
        if self.target == 0 {
            return Err(RecordValidationError::OutOfRange {
                field: "target",
                value: 0.0,
            });
        }
        Ok(())
    }
}

collection_record!(Habit, CollectionKind::Habits, habits);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub meal_type: String,
    pub calories: Option<f64>,
    pub date: String,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Meal {
    pub fn new(
        name: impl Into<String>,
        meal_type: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            meal_type: meal_type.into(),
            date: date.into(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        require_text(CollectionKind::Meals, "name", &self.name)?;
        check_choice("mealType", &self.meal_type, MEAL_TYPES)?;
        check_date("date", &self.date)?;
        if let Some(calories) = self.calories {
            check_range("calories", calories, 0.0, 20_000.0)?;
        }
        Ok(())
    }
}

collection_record!(Meal, CollectionKind::Meals, meals);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallReminder {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub date: String,
    pub time: Option<String>,
    pub notes: Option<String>,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl CallReminder {
    pub fn new(name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        require_text(CollectionKind::CallReminders, "name", &self.name)?;
        check_date("date", &self.date)?;
        if let Some(time) = self.time.as_deref().filter(|value| !value.is_empty()) {
            check_clock_time("time", time)?;
        }
        Ok(())
    }
}

collection_record!(CallReminder, CollectionKind::CallReminders, call_reminders);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BucketItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_date: Option<String>,
    pub completed: bool,
    pub completed_date: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl BucketItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        require_text(CollectionKind::BucketList, "title", &self.title)?;
        check_optional_date("targetDate", self.target_date.as_deref())?;
        check_optional_date("completedDate", self.completed_date.as_deref())
    }
}

collection_record!(BucketItem, CollectionKind::BucketList, bucket_list);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisionItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Image reference or data URL, stored as-is.
    pub image_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl VisionItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        require_text(CollectionKind::VisionBoard, "title", &self.title)
    }
}

collection_record!(VisionItem, CollectionKind::VisionBoard, vision_board);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JournalEntry {
    pub id: String,
    pub date: String,
    pub content: String,
    pub mood: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl JournalEntry {
    pub fn new(date: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        check_date("date", &self.date)?;
        require_text(CollectionKind::JournalEntries, "content", &self.content)
    }
}

collection_record!(JournalEntry, CollectionKind::JournalEntries, journal_entries);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quote {
    pub id: String,
    pub text: String,
    pub author: Option<String>,
    pub favorite: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: Option<&str>) -> Self {
        Self {
            text: text.into(),
            author: author.map(str::to_string),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        require_text(CollectionKind::Quotes, "text", &self.text)
    }
}

collection_record!(Quote, CollectionKind::Quotes, quotes);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Alarm {
    pub id: String,
    /// Ring time as `HH:MM`.
    pub time: String,
    pub label: String,
    pub enabled: bool,
    /// Repeat days (`mon`..`sun`); empty means one-shot.
    pub days: Vec<String>,
    pub sound: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Default for Alarm {
    fn default() -> Self {
        Self {
            id: String::new(),
            time: String::new(),
            label: String::new(),
            enabled: true,
            days: Vec::new(),
            sound: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Alarm {
    pub fn new(time: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        check_clock_time("time", &self.time)?;
        for day in &self.days {
            check_choice("days", day, WEEKDAYS)?;
        }
        Ok(())
    }
}

collection_record!(Alarm, CollectionKind::Alarms, alarms);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub genre: Option<String>,
    pub watched: bool,
    pub rating: Option<f64>,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Movie {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), RecordValidationError> {
        require_text(CollectionKind::Movies, "title", &self.title)?;
        if let Some(rating) = self.rating {
            check_range("rating", rating, 0.0, 10.0)?;
        }
        Ok(())
    }
}

collection_record!(Movie, CollectionKind::Movies, movies);
