//! Connectivity, sign-in and flush/pull actions on the store.
//!
//! # Invariants
//! - Sync failures land in `SyncState`; only `sign_in` returns them.
//! - A flush clears the pending queue only after every tab was written.
//! - Without a signed-in backend nothing is pushed, pulled or re-flagged.

use crate::model::collection::CollectionKind;
use crate::model::settings::SettingKey;
use crate::repo::kv_store::KeyValueStore;
use crate::service::error::{StoreError, StoreResult};
use crate::service::store::LifeStore;
use crate::sync::backend::{SheetAccount, SheetAuthRequest};
use log::{info, warn};
use serde_json::Value;
use std::time::Instant;

impl<S: KeyValueStore> LifeStore<S> {
    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn is_authenticated(&self) -> bool {
        self.sync.is_authenticated()
    }

    /// Feeds a connectivity event into the store.
    ///
    /// Going offline flags `Offline`; coming back online flushes a
    /// non-empty queue.
    pub fn set_online(&mut self, online: bool) -> StoreResult<()> {
        let was_online = self.online;
        self.online = online;
        if !online {
            self.sync_state.mark_offline();
            info!("event=connectivity module=service status=ok online=false");
            return Ok(());
        }

        info!(
            "event=connectivity module=service status=ok online=true pending={}",
            self.pending.len()
        );
        if !was_online && !self.pending.is_empty() {
            self.flush_if_ready()?;
        }
        Ok(())
    }

    /// Signs in to the remote backend and records the account binding.
    ///
    /// # Errors
    /// - `Sync` with the backend error, after `SyncState` is set to `Failed`.
    pub fn sign_in(&mut self, request: &SheetAuthRequest) -> StoreResult<SheetAccount> {
        self.sync_state.mark_started();
        let account = match self.sync.backend().authenticate(request) {
            Ok(account) => account,
            Err(err) => {
                warn!(
                    "event=sign_in module=service status=error backend={} error_code={}",
                    err.backend_id, err.code
                );
                self.sync_state.mark_failed(err.to_string());
                return Err(StoreError::Sync(err));
            }
        };

        self.kv.set(
            SettingKey::UserEmail.storage_key(),
            &Value::String(account.email.clone()),
        )?;
        self.kv.set(
            SettingKey::UserSheetId.storage_key(),
            &Value::String(account.sheet_id.clone()),
        )?;
        self.kv.set(
            SettingKey::UserSheetUrl.storage_key(),
            &Value::String(account.sheet_url.clone()),
        )?;
        self.sync_state.mark_idle();
        info!(
            "event=sign_in module=service status=ok backend={}",
            self.sync.backend().backend_id()
        );

        if !self.pending.is_empty() {
            self.flush_if_ready()?;
        }
        Ok(account)
    }

    /// Signs out and forgets the account binding; local data is kept.
    pub fn sign_out(&mut self) -> StoreResult<()> {
        self.sync.backend().sign_out();
        for key in [
            SettingKey::UserEmail,
            SettingKey::UserSheetId,
            SettingKey::UserSheetUrl,
        ] {
            self.kv.remove(key.storage_key())?;
        }
        self.sync_state.mark_idle();
        info!("event=sign_out module=service status=ok");
        Ok(())
    }

    /// Pushes every collection to the remote sheets.
    ///
    /// Returns `Ok(false)` without side effects when signed out, and
    /// `Ok(false)` with `Offline`/`Failed` status when the push cannot run or
    /// fails. On success the pending queue is cleared.
    ///
    /// # Errors
    /// - `Kv` when clearing the persisted queue fails after a good push.
    pub fn sync_to_sheets(&mut self) -> StoreResult<bool> {
        if !self.sync.is_authenticated() {
            return Ok(false);
        }
        if !self.online {
            self.sync_state.mark_offline();
            return Ok(false);
        }

        let started_at = Instant::now();
        self.sync_state.mark_started();
        let report = match self.sync.push_all(&self.collections) {
            Ok(report) => report,
            Err(err) => {
                warn!(
                    "event=sync_push module=service status=error pending={} error_code={} duration_ms={}",
                    self.pending.len(),
                    err.code,
                    started_at.elapsed().as_millis()
                );
                self.sync_state.mark_failed(err.to_string());
                return Ok(false);
            }
        };

        let flushed = self.pending.len();
        let dirty = self.pending.dirty_collections().len();
        self.pending.clear();
        self.persist_pending()?;
        self.mark_sync_success()?;
        info!(
            "event=sync_push module=service status=ok flushed={} dirty={} sheets={} rows={} duration_ms={}",
            flushed,
            dirty,
            report.sheets_written,
            report.rows_written,
            started_at.elapsed().as_millis()
        );
        Ok(true)
    }

    /// Replaces every local collection with the remote copy.
    ///
    /// Same gating and status handling as `sync_to_sheets`. The pending
    /// queue is left untouched.
    pub fn load_from_sheets(&mut self) -> StoreResult<bool> {
        if !self.sync.is_authenticated() {
            return Ok(false);
        }
        if !self.online {
            self.sync_state.mark_offline();
            return Ok(false);
        }

        let started_at = Instant::now();
        self.sync_state.mark_started();
        let pulled = match self.sync.pull_all() {
            Ok(pulled) => pulled,
            Err(err) => {
                warn!(
                    "event=sync_pull module=service status=error error_code={} duration_ms={}",
                    err.code,
                    started_at.elapsed().as_millis()
                );
                self.sync_state.mark_failed(err.to_string());
                return Ok(false);
            }
        };

        self.collections = pulled;
        for kind in CollectionKind::ALL {
            self.persist_collection(kind)?;
        }
        self.mark_sync_success()?;
        info!(
            "event=sync_pull module=service status=ok tasks={} habits={} duration_ms={}",
            self.collections.tasks.len(),
            self.collections.habits.len(),
            started_at.elapsed().as_millis()
        );
        Ok(true)
    }

    /// Flushes when online and signed in; otherwise leaves the queue alone.
    pub(crate) fn flush_if_ready(&mut self) -> StoreResult<()> {
        if self.online && self.sync.is_authenticated() {
            self.sync_to_sheets()?;
        }
        Ok(())
    }

    fn mark_sync_success(&mut self) -> StoreResult<()> {
        let now = self.clock.now_rfc3339();
        self.kv.set(
            SettingKey::LastSyncTime.storage_key(),
            &Value::String(now.clone()),
        )?;
        self.sync_state.mark_succeeded(now);
        Ok(())
    }
}
