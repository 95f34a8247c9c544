//! Task-specific actions: completion toggle and the daily rollover.

use crate::model::collection::CollectionKind;
use crate::model::record::DATE_FORMAT;
use crate::model::records::Task;
use crate::model::settings::SettingKey;
use crate::repo::kv_store::KeyValueStore;
use crate::service::error::{MutationOutcome, StoreResult};
use crate::service::store::LifeStore;
use crate::sync::pending::ChangeType;
use chrono::Days;
use log::info;
use serde_json::{json, Value};

/// What one rollover call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolloverReport {
    /// `false` when today's rollover had already run.
    pub ran: bool,
    /// Ids of tasks newly marked `notDone`.
    pub marked_task_ids: Vec<String>,
}

impl<S: KeyValueStore> LifeStore<S> {
    /// Flips a task between done and open.
    ///
    /// Completing stamps `completedDate` with today and clears `notDone`;
    /// reopening clears `completedDate`.
    pub fn toggle_task(&mut self, id: &str) -> StoreResult<MutationOutcome> {
        let Some(task) = self.get::<Task>(id) else {
            return Ok(MutationOutcome::NotFound);
        };

        let patch = if task.completed {
            json!({ "completed": false, "completedDate": Value::Null })
        } else {
            let today = self.clock.today().format(DATE_FORMAT).to_string();
            json!({ "completed": true, "completedDate": today, "notDone": false })
        };
        self.update::<Task>(id, patch)
    }

    /// Marks yesterday's unfinished tasks `notDone`, at most once per day.
    ///
    /// # Invariants
    /// - Guarded by `lastRolloverDate`; a second call on the same day is a no-op.
    /// - Tasks are marked, never deleted.
    pub fn perform_daily_rollover(&mut self) -> StoreResult<RolloverReport> {
        let today = self.clock.today();
        let today_text = today.format(DATE_FORMAT).to_string();
        let marker_key = SettingKey::LastRolloverDate.storage_key();

        let last_run = self.text_setting(SettingKey::LastRolloverDate)?;
        if last_run.as_deref() == Some(today_text.as_str()) {
            return Ok(RolloverReport::default());
        }

        let yesterday = today
            .checked_sub_days(Days::new(1))
            .map(|day| day.format(DATE_FORMAT).to_string());
        let now = self.clock.now_rfc3339();

        let mut marked_task_ids = Vec::new();
        if let Some(yesterday) = yesterday.as_deref() {
            for task in self.collections.tasks.iter_mut() {
                if task.completed || task.not_done || task.date.as_deref() != Some(yesterday) {
                    continue;
                }
                task.not_done = true;
                task.updated_at = Some(now.clone());
                marked_task_ids.push(task.id.clone());
            }
        }

        self.kv.set(marker_key, &Value::String(today_text))?;
        if !marked_task_ids.is_empty() {
            self.persist_collection(CollectionKind::Tasks)?;
            for id in &marked_task_ids {
                self.record_change(
                    ChangeType::Update,
                    CollectionKind::Tasks,
                    json!({ "id": id, "notDone": true }),
                )?;
            }
        }

        info!(
            "event=daily_rollover module=service status=ok marked={}",
            marked_task_ids.len()
        );
        Ok(RolloverReport {
            ran: true,
            marked_task_ids,
        })
    }
}
