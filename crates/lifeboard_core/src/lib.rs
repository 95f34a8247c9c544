//! Core domain logic for Lifeboard.
//! This crate is the single source of truth for record invariants,
//! local persistence and spreadsheet sync.

pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use bootstrap::{open_store, open_store_with, BootstrapError, BootstrapResult};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ConfigResult, CoreConfig, SheetsConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::CollectionKind;
pub use model::record::{CollectionRecord, RecordValidationError};
pub use model::records::{
    Alarm, BucketItem, CallReminder, Expense, Habit, JournalEntry, Meal, Movie, Note, Quote,
    Task, VisionItem,
};
pub use repo::kv_store::{KeyValueStore, KvError, KvResult, SqliteKeyValueStore};
pub use service::error::{MutationOutcome, StoreError, StoreResult};
pub use service::store::{LifeStore, StoreDeps, StoreOptions};
pub use sync::backend::{SheetAccount, SheetAuthRequest, SheetBackend, SheetError, SheetResult};
pub use sync::status::{SyncState, SyncStatus};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
