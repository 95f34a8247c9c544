//! Scalar settings persisted next to the collections.

/// Scalar keys the store reads and writes outside of collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    DarkMode,
    UserEmail,
    UserSheetId,
    UserSheetUrl,
    LastSyncTime,
    LastRolloverDate,
    StreakData,
    PendingChanges,
    /// Last id issued per collection.
    IdCursors,
}

impl SettingKey {
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::DarkMode => "darkMode",
            Self::UserEmail => "userEmail",
            Self::UserSheetId => "userSheetId",
            Self::UserSheetUrl => "userSheetUrl",
            Self::LastSyncTime => "lastSyncTime",
            Self::LastRolloverDate => "lastRolloverDate",
            Self::StreakData => "streakData",
            Self::PendingChanges => "pendingChanges",
            Self::IdCursors => "idCursors",
        }
    }
}
