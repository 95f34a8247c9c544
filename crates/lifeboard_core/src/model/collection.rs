//! Named collections and their storage keys.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Every named collection the store persists and syncs.
///
/// Serialized as the storage key (`tasks`, `habitHistory`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Tasks,
    Expenses,
    Notes,
    Habits,
    HabitHistory,
    Meals,
    CallReminders,
    CompletedCallReminders,
    BucketList,
    VisionBoard,
    JournalEntries,
    Quotes,
    Alarms,
    Movies,
}

impl CollectionKind {
    /// All collections in push order.
    pub const ALL: [CollectionKind; 14] = [
        Self::Tasks,
        Self::Expenses,
        Self::Notes,
        Self::Habits,
        Self::HabitHistory,
        Self::Meals,
        Self::CallReminders,
        Self::CompletedCallReminders,
        Self::BucketList,
        Self::VisionBoard,
        Self::JournalEntries,
        Self::Quotes,
        Self::Alarms,
        Self::Movies,
    ];

    /// Key under which the collection is persisted locally.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Expenses => "expenses",
            Self::Notes => "notes",
            Self::Habits => "habits",
            Self::HabitHistory => "habitHistory",
            Self::Meals => "meals",
            Self::CallReminders => "callReminders",
            Self::CompletedCallReminders => "completedCallReminders",
            Self::BucketList => "bucketList",
            Self::VisionBoard => "visionBoard",
            Self::JournalEntries => "journalEntries",
            Self::Quotes => "quotes",
            Self::Alarms => "alarms",
            Self::Movies => "movies",
        }
    }

    /// Remote tab name the collection maps to.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Self::Tasks => "Tasks",
            Self::Expenses => "Expenses",
            Self::Notes => "Notes",
            Self::Habits => "Habits",
            Self::HabitHistory => "HabitHistory",
            Self::Meals => "Meals",
            Self::CallReminders => "CallReminders",
            Self::CompletedCallReminders => "CompletedCallReminders",
            Self::BucketList => "BucketList",
            Self::VisionBoard => "VisionBoard",
            Self::JournalEntries => "Journal",
            Self::Quotes => "Quotes",
            Self::Alarms => "Alarms",
            Self::Movies => "Movies",
        }
    }
}

impl Display for CollectionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key())
    }
}
