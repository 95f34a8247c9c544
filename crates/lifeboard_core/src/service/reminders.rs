//! Call reminder completion flow.

use crate::model::collection::CollectionKind;
use crate::model::records::CallReminder;
use crate::repo::kv_store::KeyValueStore;
use crate::service::error::{MutationOutcome, StoreError, StoreResult};
use crate::service::store::LifeStore;
use crate::sync::pending::ChangeType;
use serde_json::json;

impl<S: KeyValueStore> LifeStore<S> {
    pub fn completed_call_reminders(&self) -> &[CallReminder] {
        &self.collections.completed_call_reminders
    }

    /// Moves a reminder into `completedCallReminders`, stamping `completedAt`.
    pub fn complete_call_reminder(&mut self, id: &str) -> StoreResult<MutationOutcome> {
        let Some(index) = self
            .collections
            .call_reminders
            .iter()
            .position(|reminder| reminder.id == id)
        else {
            return Ok(MutationOutcome::NotFound);
        };

        let now = self.clock.now_rfc3339();
        let mut reminder = self.collections.call_reminders[index].clone();
        reminder.completed = true;
        reminder.completed_at = Some(now.clone());
        reminder.updated_at = Some(now);
        let data = serde_json::to_value(&reminder).map_err(|err| {
            StoreError::serialization(CollectionKind::CompletedCallReminders.storage_key(), &err)
        })?;
        self.collections.call_reminders.remove(index);
        self.collections.completed_call_reminders.push(reminder);

        self.persist_collection(CollectionKind::CallReminders)?;
        self.persist_collection(CollectionKind::CompletedCallReminders)?;
        self.record_change(
            ChangeType::Delete,
            CollectionKind::CallReminders,
            json!({ "id": id, "deleted": true }),
        )?;
        self.record_change(ChangeType::Add, CollectionKind::CompletedCallReminders, data)?;
        Ok(MutationOutcome::Applied)
    }

    /// Removes an entry from the completed list.
    pub fn delete_completed_call_reminder(&mut self, id: &str) -> StoreResult<MutationOutcome> {
        let before = self.collections.completed_call_reminders.len();
        self.collections
            .completed_call_reminders
            .retain(|reminder| reminder.id != id);
        if self.collections.completed_call_reminders.len() == before {
            return Ok(MutationOutcome::NotFound);
        }

        self.persist_collection(CollectionKind::CompletedCallReminders)?;
        self.record_change(
            ChangeType::Delete,
            CollectionKind::CompletedCallReminders,
            json!({ "id": id, "deleted": true }),
        )?;
        Ok(MutationOutcome::Applied)
    }
}
