//! Sync status state machine.
//!
//! `Idle -> Syncing -> {Success | Failed | Offline}`; any later trigger moves
//! back to `Syncing`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Success,
    Failed,
    Offline,
}

/// Status flags exposed to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    status: SyncStatus,
    last_error: Option<String>,
    last_success_at: Option<String>,
}

impl SyncState {
    pub fn status(&self) -> SyncStatus {
        self.status
    }

    /// Message of the most recent failure; cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_success_at(&self) -> Option<&str> {
        self.last_success_at.as_deref()
    }

    pub(crate) fn restore_last_success(&mut self, at: Option<String>) {
        self.last_success_at = at;
    }

    pub(crate) fn mark_idle(&mut self) {
        self.status = SyncStatus::Idle;
    }

    pub(crate) fn mark_started(&mut self) {
        self.status = SyncStatus::Syncing;
    }

    pub(crate) fn mark_succeeded(&mut self, at: String) {
        self.status = SyncStatus::Success;
        self.last_error = None;
        self.last_success_at = Some(at);
    }

    pub(crate) fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = SyncStatus::Failed;
        self.last_error = Some(message.into());
    }

    pub(crate) fn mark_offline(&mut self) {
        self.status = SyncStatus::Offline;
    }
}
