use chrono::NaiveDate;
use lifeboard_core::db::open_db_in_memory;
use lifeboard_core::sync::memory_backend::InMemorySheetBackend;
use lifeboard_core::{
    Habit, KeyValueStore, LifeStore, ManualClock, SheetAuthRequest, SheetBackend,
    SqliteKeyValueStore, StoreDeps, StoreError, StoreOptions, SyncStatus, Task,
};
use serde_json::json;
use std::sync::Arc;

fn fresh_kv() -> SqliteKeyValueStore {
    SqliteKeyValueStore::try_new(open_db_in_memory().unwrap()).unwrap()
}

fn start(
    kv: SqliteKeyValueStore,
    backend: &Arc<InMemorySheetBackend>,
    start_online: bool,
) -> LifeStore<SqliteKeyValueStore> {
    let backend: Arc<dyn SheetBackend> = backend.clone();
    LifeStore::initialize(
        StoreDeps {
            kv,
            backend,
            clock: Arc::new(ManualClock::at_day(
                NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            )),
        },
        StoreOptions {
            start_online,
            run_rollover: false,
        },
    )
    .unwrap()
}

fn auth(email: &str) -> SheetAuthRequest {
    SheetAuthRequest {
        email: email.to_string(),
        access_token: "token".to_string(),
        spreadsheet_id: Some("sheet-1".to_string()),
    }
}

#[test]
fn signed_out_store_never_pushes() {
    let backend = Arc::new(InMemorySheetBackend::new());
    let mut store = start(fresh_kv(), &backend, true);
    store.add(Task::new("local only", None)).unwrap();

    assert!(!store.sync_to_sheets().unwrap());
    assert!(!store.load_from_sheets().unwrap());
    assert_eq!(store.sync_state().status(), SyncStatus::Idle);
    assert_eq!(store.pending_changes().len(), 1);
    assert_eq!(backend.write_count(), 0);
}

#[test]
fn online_mutation_flushes_immediately() {
    let backend = Arc::new(InMemorySheetBackend::signed_in("me@example.com"));
    let mut store = start(fresh_kv(), &backend, true);

    let task = store.add(Task::new("synced", None)).unwrap();

    assert!(store.pending_changes().is_empty());
    assert_eq!(store.sync_state().status(), SyncStatus::Success);
    assert_eq!(
        store.last_sync_time().unwrap().as_deref(),
        Some("2026-07-01T00:00:00.000Z")
    );
    let rows = backend.tab("Tasks").unwrap();
    assert_eq!(rows[0][0], "id");
    assert_eq!(rows[1][0], task.id);
}

#[test]
fn offline_changes_flush_when_connectivity_returns() {
    let backend = Arc::new(InMemorySheetBackend::signed_in("me@example.com"));
    let mut store = start(fresh_kv(), &backend, false);

    store.add(Task::new("first", None)).unwrap();
    store.add(Task::new("second", None)).unwrap();
    assert_eq!(store.pending_changes().len(), 2);
    assert_eq!(backend.write_count(), 0);

    assert!(!store.sync_to_sheets().unwrap());
    assert_eq!(store.sync_state().status(), SyncStatus::Offline);

    store.set_online(true).unwrap();
    assert!(store.pending_changes().is_empty());
    assert_eq!(store.sync_state().status(), SyncStatus::Success);
    assert_eq!(backend.tab("Tasks").unwrap().len(), 3);
}

#[test]
fn pending_queue_survives_restart_and_flushes_on_initialize() {
    let backend = Arc::new(InMemorySheetBackend::signed_in("me@example.com"));
    let mut store = start(fresh_kv(), &backend, false);
    store.add(Task::new("queued offline", None)).unwrap();
    let kv = store.shutdown();
    assert_eq!(kv.get("pendingChanges").unwrap().unwrap()[0]["type"], json!("add"));

    let offline_again = start(kv, &backend, false);
    assert_eq!(offline_again.pending_changes().len(), 1);
    let kv = offline_again.shutdown();

    let store = start(kv, &backend, true);
    assert!(store.pending_changes().is_empty());
    assert_eq!(backend.tab("Tasks").unwrap().len(), 2);
    let kv = store.shutdown();
    assert_eq!(kv.get("pendingChanges").unwrap(), Some(json!([])));
}

#[test]
fn failed_push_keeps_queue_and_reports_error() {
    let backend = Arc::new(InMemorySheetBackend::signed_in("me@example.com"));
    backend.set_write_failure(Some("quota exceeded"));
    let mut store = start(fresh_kv(), &backend, true);

    store.add(Task::new("retry me", None)).unwrap();
    assert_eq!(store.pending_changes().len(), 1);
    assert_eq!(store.sync_state().status(), SyncStatus::Failed);
    assert!(store
        .sync_state()
        .last_error()
        .unwrap()
        .contains("quota exceeded"));

    backend.set_write_failure(None);
    assert!(store.sync_to_sheets().unwrap());
    assert!(store.pending_changes().is_empty());
    assert_eq!(store.sync_state().status(), SyncStatus::Success);
    assert_eq!(store.sync_state().last_error(), None);
}

#[test]
fn sign_in_failure_is_returned_and_flagged() {
    let backend = Arc::new(InMemorySheetBackend::new());
    backend.set_auth_failure(Some("consent revoked"));
    let mut store = start(fresh_kv(), &backend, true);

    let err = store.sign_in(&auth("me@example.com")).unwrap_err();
    match err {
        StoreError::Sync(sheet_err) => assert_eq!(sheet_err.code, "auth_rejected"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.sync_state().status(), SyncStatus::Failed);
    assert!(!store.is_authenticated());
    assert_eq!(store.user_email().unwrap(), None);
}

#[test]
fn sign_in_records_account_and_flushes_pending() {
    let backend = Arc::new(InMemorySheetBackend::new());
    let mut store = start(fresh_kv(), &backend, true);
    store.add(Task::new("before sign-in", None)).unwrap();

    let account = store.sign_in(&auth("me@example.com")).unwrap();
    assert_eq!(account.sheet_id, "sheet-1");
    assert_eq!(store.user_email().unwrap().as_deref(), Some("me@example.com"));
    assert_eq!(store.user_sheet_id().unwrap().as_deref(), Some("sheet-1"));
    assert_eq!(
        store.user_sheet_url().unwrap().as_deref(),
        Some("memory://sheets/sheet-1")
    );
    assert!(store.pending_changes().is_empty());

    store.sign_out().unwrap();
    assert!(!store.is_authenticated());
    assert_eq!(store.user_email().unwrap(), None);
    assert_eq!(store.user_sheet_id().unwrap(), None);

    store.add(Task::new("after sign-out", None)).unwrap();
    assert!(!store.sync_to_sheets().unwrap());
    assert_eq!(store.pending_changes().len(), 1);
    assert_eq!(store.list::<Task>().len(), 2);
}

#[test]
fn load_from_sheets_replaces_local_collections() {
    let backend = Arc::new(InMemorySheetBackend::signed_in("me@example.com"));
    let mut source = start(fresh_kv(), &backend, true);
    let task = source.add(Task::new("from laptop", Some("2026-07-01"))).unwrap();
    let habit = source.add(Habit::new("floss")).unwrap();
    source.toggle_habit_day(&habit.id, "2026-07-01").unwrap();

    let mut target = start(fresh_kv(), &backend, false);
    target.add(Task::new("stale phone task", None)).unwrap();
    target.set_online(true).unwrap();
    // Flushing on reconnect overwrote the tabs; restore the laptop copy.
    assert!(source.sync_to_sheets().unwrap());

    assert!(target.load_from_sheets().unwrap());
    let tasks = target.list::<Task>();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, task.id);
    assert_eq!(tasks[0].date.as_deref(), Some("2026-07-01"));
    assert_eq!(target.list::<Habit>()[0].name, "floss");
    assert!(target.habit_history().is_done(&habit.id, "2026-07-01"));

    let kv = target.shutdown();
    assert_eq!(kv.get("tasks").unwrap().unwrap()[0]["id"], json!(task.id));
}

#[test]
fn failed_pull_leaves_local_state_alone() {
    let backend = Arc::new(InMemorySheetBackend::signed_in("me@example.com"));
    let mut store = start(fresh_kv(), &backend, true);
    store.add(Task::new("keep me", None)).unwrap();
    backend.set_read_failure(Some("timeout"));

    assert!(!store.load_from_sheets().unwrap());
    assert_eq!(store.sync_state().status(), SyncStatus::Failed);
    assert_eq!(store.list::<Task>().len(), 1);
}

fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn load_from_sheets_skips_bad_rows_and_unknown_habit_history() {
    let backend = Arc::new(InMemorySheetBackend::signed_in("me@example.com"));
    backend.put_tab(
        "Habits",
        vec![
            cells(&["id", "name", "frequency", "target"]),
            cells(&["1", "Meditate", "daily", "1"]),
        ],
    );
    backend.put_tab(
        "HabitHistory",
        vec![
            cells(&["habitId", "date", "completed"]),
            cells(&["ghost", "2026-01-01", "true"]),
        ],
    );
    backend.put_tab(
        "Tasks",
        vec![
            cells(&["id", "text", "priority"]),
            cells(&["5", "ok", "high"]),
            cells(&["6", "", "high"]),
        ],
    );
    let mut store = start(fresh_kv(), &backend, false);

    assert!(store.load_from_sheets().unwrap());
    assert_eq!(store.list::<Habit>().len(), 1);
    assert!(!store.habit_history().is_done("ghost", "2026-01-01"));
    assert!(store.habit_history().is_empty());
    let tasks = store.list::<Task>();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "5");
}
