//! Process-local `SheetBackend` with failure injection.

use crate::sync::backend::{
    SheetAccount, SheetAuthRequest, SheetBackend, SheetError, SheetResult, SyncStage,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

const BACKEND_ID: &str = "memory";

#[derive(Debug, Default)]
struct MemoryState {
    account: Option<SheetAccount>,
    tabs: BTreeMap<String, Vec<Vec<String>>>,
    write_failure: Option<String>,
    read_failure: Option<String>,
    auth_failure: Option<String>,
    write_count: usize,
}

/// Tabs live in a map; auth accepts any non-blank token.
#[derive(Debug, Default)]
pub struct InMemorySheetBackend {
    state: Mutex<MemoryState>,
}

impl InMemorySheetBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that starts out signed in as `email`.
    pub fn signed_in(email: &str) -> Self {
        let backend = Self::new();
        backend.lock().account = Some(memory_account(email, "memory-sheet"));
        backend
    }

    /// Makes every subsequent write fail with `message` (or succeed on `None`).
    pub fn set_write_failure(&self, message: Option<&str>) {
        self.lock().write_failure = message.map(str::to_string);
    }

    pub fn set_read_failure(&self, message: Option<&str>) {
        self.lock().read_failure = message.map(str::to_string);
    }

    pub fn set_auth_failure(&self, message: Option<&str>) {
        self.lock().auth_failure = message.map(str::to_string);
    }

    /// Current rows of one tab, header included.
    pub fn tab(&self, sheet: &str) -> Option<Vec<Vec<String>>> {
        self.lock().tabs.get(sheet).cloned()
    }

    /// Seeds a tab as if another device had pushed it.
    pub fn put_tab(&self, sheet: &str, rows: Vec<Vec<String>>) {
        self.lock().tabs.insert(sheet.to_string(), rows);
    }

    /// Number of successful tab writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().write_count
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SheetBackend for InMemorySheetBackend {
    fn backend_id(&self) -> &str {
        BACKEND_ID
    }

    fn is_authenticated(&self) -> bool {
        self.lock().account.is_some()
    }

    fn authenticate(&self, request: &SheetAuthRequest) -> SheetResult<SheetAccount> {
        let mut state = self.lock();
        if let Some(message) = state.auth_failure.clone() {
            return Err(SheetError::new(
                BACKEND_ID,
                SyncStage::Auth,
                "auth_rejected",
                message,
                false,
            ));
        }
        if request.access_token.trim().is_empty() {
            return Err(SheetError::new(
                BACKEND_ID,
                SyncStage::Auth,
                "invalid_credentials",
                "Access token is empty.",
                false,
            ));
        }

        let sheet_id = request
            .spreadsheet_id
            .clone()
            .unwrap_or_else(|| "memory-sheet".to_string());
        let account = memory_account(&request.email, &sheet_id);
        state.account = Some(account.clone());
        Ok(account)
    }

    fn sign_out(&self) {
        self.lock().account = None;
    }

    fn write_range(&self, sheet: &str, rows: &[Vec<String>]) -> SheetResult<()> {
        let mut state = self.lock();
        if state.account.is_none() {
            return Err(SheetError::not_authenticated(BACKEND_ID, SyncStage::Push));
        }
        if let Some(message) = state.write_failure.clone() {
            return Err(SheetError::new(
                BACKEND_ID,
                SyncStage::Push,
                "write_failed",
                message,
                true,
            ));
        }
        state.tabs.insert(sheet.to_string(), rows.to_vec());
        state.write_count += 1;
        Ok(())
    }

    fn read_range(&self, sheet: &str) -> SheetResult<Vec<Vec<String>>> {
        let state = self.lock();
        if state.account.is_none() {
            return Err(SheetError::not_authenticated(BACKEND_ID, SyncStage::Pull));
        }
        if let Some(message) = state.read_failure.clone() {
            return Err(SheetError::new(
                BACKEND_ID,
                SyncStage::Pull,
                "read_failed",
                message,
                true,
            ));
        }
        Ok(state.tabs.get(sheet).cloned().unwrap_or_default())
    }
}

fn memory_account(email: &str, sheet_id: &str) -> SheetAccount {
    SheetAccount {
        email: email.to_string(),
        sheet_id: sheet_id.to_string(),
        sheet_url: format!("memory://sheets/{sheet_id}"),
    }
}
