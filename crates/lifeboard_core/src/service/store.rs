//! Central store: collections, persistence and the pending-change queue.
//!
//! # Responsibility
//! - Own the in-memory collections and mirror every mutation to the
//!   key-value store.
//! - Record one pending change per mutation and flush opportunistically.
//!
//! # Invariants
//! - All reads and writes of collection state go through `LifeStore`.
//! - Each mutation rewrites its whole collection key; nothing is patched.
//! - Ids are assigned by the store, unique per collection, never rewritten.
//! - Corrupt persisted state fails `initialize` instead of being masked.

use crate::clock::Clock;
use crate::model::collection::CollectionKind;
use crate::model::collections::Collections;
use crate::model::record::{CollectionRecord, RecordValidationError};
use crate::model::settings::SettingKey;
use crate::repo::kv_store::KeyValueStore;
use crate::service::error::{MutationOutcome, StoreError, StoreResult};
use crate::sync::backend::SheetBackend;
use crate::sync::pending::{ChangeType, PendingChange, PendingQueue};
use crate::sync::sheet_sync::SheetSyncService;
use crate::sync::status::SyncState;
use log::{debug, info};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Collaborators injected into a store instance.
pub struct StoreDeps<S: KeyValueStore> {
    pub kv: S,
    pub backend: Arc<dyn SheetBackend>,
    pub clock: Arc<dyn Clock>,
}

/// Startup switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Initial connectivity; later changes arrive through `set_online`.
    pub start_online: bool,
    /// Whether `initialize` runs the daily rollover.
    pub run_rollover: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            start_online: true,
            run_rollover: true,
        }
    }
}

pub struct LifeStore<S: KeyValueStore> {
    pub(crate) kv: S,
    pub(crate) sync: SheetSyncService,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) collections: Collections,
    pub(crate) pending: PendingQueue,
    pub(crate) sync_state: SyncState,
    pub(crate) online: bool,
    /// Last id issued per collection storage key; survives deletes.
    id_cursors: BTreeMap<String, i64>,
}

impl<S: KeyValueStore> LifeStore<S> {
    /// Loads every collection and the pending queue from `deps.kv`.
    ///
    /// # Side effects
    /// - Runs the daily rollover when enabled.
    /// - Flushes a non-empty queue left by a previous session when online
    ///   and signed in.
    ///
    /// # Errors
    /// - `Serialization` when a stored collection no longer matches its type.
    /// - `Kv` on storage failures.
    pub fn initialize(deps: StoreDeps<S>, options: StoreOptions) -> StoreResult<Self> {
        let started_at = Instant::now();
        let StoreDeps { kv, backend, clock } = deps;

        let mut collections = Collections::default();
        for kind in CollectionKind::ALL {
            if let Some(document) = kv.get(kind.storage_key())? {
                collections
                    .load_document(kind, document)
                    .map_err(|err| StoreError::serialization(kind.storage_key(), &err))?;
            }
        }

        let pending_key = SettingKey::PendingChanges.storage_key();
        let pending = match kv.get(pending_key)? {
            Some(document) => PendingQueue::from_changes(
                serde_json::from_value::<Vec<PendingChange>>(document)
                    .map_err(|err| StoreError::serialization(pending_key, &err))?,
            ),
            None => PendingQueue::new(),
        };

        let cursors_key = SettingKey::IdCursors.storage_key();
        let id_cursors = match kv.get(cursors_key)? {
            Some(document) => serde_json::from_value::<BTreeMap<String, i64>>(document)
                .map_err(|err| StoreError::serialization(cursors_key, &err))?,
            None => BTreeMap::new(),
        };

        let mut sync_state = SyncState::default();
        sync_state.restore_last_success(
            kv.get(SettingKey::LastSyncTime.storage_key())?
                .and_then(|value| value.as_str().map(str::to_string)),
        );

        let mut store = Self {
            kv,
            sync: SheetSyncService::new(backend),
            clock,
            collections,
            pending,
            sync_state,
            online: options.start_online,
            id_cursors,
        };

        info!(
            "event=store_init module=service status=ok tasks={} habits={} pending={} online={} duration_ms={}",
            store.collections.tasks.len(),
            store.collections.habits.len(),
            store.pending.len(),
            store.online,
            started_at.elapsed().as_millis()
        );

        if options.run_rollover {
            store.perform_daily_rollover()?;
        }
        if !store.pending.is_empty() {
            store.flush_if_ready()?;
        }
        Ok(store)
    }

    /// Ends the store's lifetime and hands back the key-value store.
    pub fn shutdown(self) -> S {
        info!(
            "event=store_shutdown module=service status=ok pending={}",
            self.pending.len()
        );
        self.kv
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn list<T: CollectionRecord>(&self) -> &[T] {
        T::slot(&self.collections)
    }

    pub fn get<T: CollectionRecord>(&self, id: &str) -> Option<&T> {
        T::slot(&self.collections)
            .iter()
            .find(|record| record.id() == id)
    }

    /// Adds a record, assigning its id and creation stamp.
    ///
    /// Any id or timestamps already on `record` are overwritten.
    pub fn add<T: CollectionRecord>(&mut self, mut record: T) -> StoreResult<T> {
        let id = self.next_id::<T>();
        record.assign_identity(id.to_string(), self.clock.now_rfc3339());
        record.validate()?;
        self.advance_id_cursor(T::KIND, id)?;

        let data = serde_json::to_value(&record)
            .map_err(|err| StoreError::serialization(T::KIND.storage_key(), &err))?;
        T::slot_mut(&mut self.collections).push(record.clone());
        self.persist_collection(T::KIND)?;
        self.record_change(ChangeType::Add, T::KIND, data)?;

        debug!(
            "event=record_add module=service status=ok collection={} id={}",
            T::KIND,
            record.id()
        );
        Ok(record)
    }

    /// Merges a JSON object `patch` into record `id`.
    ///
    /// # Errors
    /// - `Validation(ImmutableField)` when the patch rewrites `id`/`createdAt`.
    /// - `Validation(MalformedPatch)` when the merged record no longer parses.
    pub fn update<T: CollectionRecord>(
        &mut self,
        id: &str,
        patch: Value,
    ) -> StoreResult<MutationOutcome> {
        let Value::Object(patch) = patch else {
            return Err(RecordValidationError::MalformedPatch {
                collection: T::KIND,
                message: "patch must be a JSON object".to_string(),
            }
            .into());
        };
        if patch.get("id").is_some_and(|value| value.as_str() != Some(id)) {
            return Err(RecordValidationError::ImmutableField("id").into());
        }
        if patch.contains_key("createdAt") {
            return Err(RecordValidationError::ImmutableField("createdAt").into());
        }

        let Some(index) = T::slot(&self.collections)
            .iter()
            .position(|record| record.id() == id)
        else {
            debug!(
                "event=record_update module=service status=skip collection={} reason=not_found",
                T::KIND
            );
            return Ok(MutationOutcome::NotFound);
        };

        let current = &T::slot(&self.collections)[index];
        let mut merged = match serde_json::to_value(current) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => Map::new(),
            Err(err) => return Err(StoreError::serialization(T::KIND.storage_key(), &err)),
        };
        for (field, value) in &patch {
            merged.insert(field.clone(), value.clone());
        }

        let mut updated: T = serde_json::from_value(Value::Object(merged)).map_err(|err| {
            RecordValidationError::MalformedPatch {
                collection: T::KIND,
                message: err.to_string(),
            }
        })?;
        updated.set_updated_at(self.clock.now_rfc3339());
        updated.validate()?;

        T::slot_mut(&mut self.collections)[index] = updated;
        self.persist_collection(T::KIND)?;

        let mut data = patch;
        data.insert("id".to_string(), Value::String(id.to_string()));
        self.record_change(ChangeType::Update, T::KIND, Value::Object(data))?;
        Ok(MutationOutcome::Applied)
    }

    /// Removes record `id` from its collection.
    ///
    /// Deleting a habit also drops its history entries.
    pub fn delete<T: CollectionRecord>(&mut self, id: &str) -> StoreResult<MutationOutcome> {
        let slot = T::slot_mut(&mut self.collections);
        let before = slot.len();
        slot.retain(|record| record.id() != id);
        if slot.len() == before {
            debug!(
                "event=record_delete module=service status=skip collection={} reason=not_found",
                T::KIND
            );
            return Ok(MutationOutcome::NotFound);
        }

        self.persist_collection(T::KIND)?;
        if T::KIND == CollectionKind::Habits && self.collections.habit_history.remove_habit(id) {
            self.persist_collection(CollectionKind::HabitHistory)?;
        }
        self.record_change(ChangeType::Delete, T::KIND, json!({ "id": id, "deleted": true }))?;
        Ok(MutationOutcome::Applied)
    }

    /// Queued changes awaiting a successful flush.
    pub fn pending_changes(&self) -> &[PendingChange] {
        self.pending.changes()
    }

    pub fn sync_state(&self) -> &SyncState {
        &self.sync_state
    }

    pub fn dark_mode(&self) -> StoreResult<bool> {
        Ok(self
            .setting(SettingKey::DarkMode)?
            .and_then(|value| value.as_bool())
            .unwrap_or(false))
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> StoreResult<()> {
        self.kv
            .set(SettingKey::DarkMode.storage_key(), &Value::Bool(enabled))?;
        Ok(())
    }

    pub fn user_email(&self) -> StoreResult<Option<String>> {
        self.text_setting(SettingKey::UserEmail)
    }

    pub fn user_sheet_id(&self) -> StoreResult<Option<String>> {
        self.text_setting(SettingKey::UserSheetId)
    }

    pub fn user_sheet_url(&self) -> StoreResult<Option<String>> {
        self.text_setting(SettingKey::UserSheetUrl)
    }

    pub fn last_sync_time(&self) -> StoreResult<Option<String>> {
        self.text_setting(SettingKey::LastSyncTime)
    }

    pub fn streak_data(&self) -> StoreResult<Option<Value>> {
        self.setting(SettingKey::StreakData)
    }

    pub fn set_streak_data(&mut self, data: &Value) -> StoreResult<()> {
        self.kv.set(SettingKey::StreakData.storage_key(), data)?;
        Ok(())
    }

    pub(crate) fn setting(&self, key: SettingKey) -> StoreResult<Option<Value>> {
        Ok(self.kv.get(key.storage_key())?)
    }

    /// Reads a scalar text setting; raw scalars may decode as numbers or bools.
    pub(crate) fn text_setting(&self, key: SettingKey) -> StoreResult<Option<String>> {
        Ok(self.setting(key)?.and_then(|value| match value {
            Value::String(text) => Some(text),
            Value::Null => None,
            other => Some(other.to_string()),
        }))
    }

    pub(crate) fn persist_collection(&mut self, kind: CollectionKind) -> StoreResult<()> {
        let document = self
            .collections
            .to_document(kind)
            .map_err(|err| StoreError::serialization(kind.storage_key(), &err))?;
        self.kv.set(kind.storage_key(), &document)?;
        Ok(())
    }

    pub(crate) fn persist_pending(&mut self) -> StoreResult<()> {
        let key = SettingKey::PendingChanges.storage_key();
        let document = self
            .pending
            .to_document()
            .map_err(|err| StoreError::serialization(key, &err))?;
        self.kv.set(key, &document)?;
        Ok(())
    }

    /// Appends a change descriptor, persists the queue and tries a flush.
    pub(crate) fn record_change(
        &mut self,
        change_type: ChangeType,
        collection: CollectionKind,
        data: Value,
    ) -> StoreResult<()> {
        self.pending.push(PendingChange {
            change_type,
            collection,
            data,
            timestamp: self.clock.now_rfc3339(),
        });
        self.persist_pending()?;
        self.flush_if_ready()
    }

    /// Millisecond timestamp id, bumped past both the last id issued for the
    /// collection and the newest numeric id present in it.
    fn next_id<T: CollectionRecord>(&self) -> i64 {
        let now = self.clock.now_millis();
        let issued = self.id_cursors.get(T::KIND.storage_key()).copied();
        let newest = T::slot(&self.collections)
            .iter()
            .filter_map(|record| record.id().parse::<i64>().ok())
            .max();
        match issued.max(newest) {
            Some(floor) if floor >= now => floor + 1,
            _ => now,
        }
    }

    fn advance_id_cursor(&mut self, kind: CollectionKind, id: i64) -> StoreResult<()> {
        self.id_cursors.insert(kind.storage_key().to_string(), id);
        let key = SettingKey::IdCursors.storage_key();
        let document = serde_json::to_value(&self.id_cursors)
            .map_err(|err| StoreError::serialization(key, &err))?;
        self.kv.set(key, &document)?;
        Ok(())
    }
}
