use chrono::{Duration, NaiveDate};
use lifeboard_core::db::open_db_in_memory;
use lifeboard_core::sync::memory_backend::InMemorySheetBackend;
use lifeboard_core::{
    KeyValueStore, LifeStore, ManualClock, SqliteKeyValueStore, StoreDeps, StoreOptions, Task,
};
use serde_json::json;
use std::sync::Arc;

fn day(year: i32, month: u32, date: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, date).unwrap()
}

fn start(
    kv: SqliteKeyValueStore,
    clock: &Arc<ManualClock>,
    run_rollover: bool,
) -> LifeStore<SqliteKeyValueStore> {
    LifeStore::initialize(
        StoreDeps {
            kv,
            backend: Arc::new(InMemorySheetBackend::new()),
            clock: clock.clone(),
        },
        StoreOptions {
            start_online: true,
            run_rollover,
        },
    )
    .unwrap()
}

fn fresh_kv() -> SqliteKeyValueStore {
    SqliteKeyValueStore::try_new(open_db_in_memory().unwrap()).unwrap()
}

#[test]
fn toggle_task_stamps_and_clears_completion() {
    let clock = Arc::new(ManualClock::at_day(day(2026, 5, 2)));
    let mut store = start(fresh_kv(), &clock, false);
    let task = store.add(Task::new("file taxes", Some("2026-05-02"))).unwrap();

    assert!(store.toggle_task(&task.id).unwrap().is_applied());
    let done = store.get::<Task>(&task.id).unwrap();
    assert!(done.completed);
    assert_eq!(done.completed_date.as_deref(), Some("2026-05-02"));
    assert!(!done.not_done);

    assert!(store.toggle_task(&task.id).unwrap().is_applied());
    let reopened = store.get::<Task>(&task.id).unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_date, None);
    assert_eq!(store.pending_changes().len(), 3);
}

#[test]
fn completing_a_missed_task_clears_not_done() {
    let clock = Arc::new(ManualClock::at_day(day(2026, 5, 2)));
    let mut store = start(fresh_kv(), &clock, false);
    let task = store.add(Task::new("call bank", Some("2026-05-01"))).unwrap();
    store.perform_daily_rollover().unwrap();
    assert!(store.get::<Task>(&task.id).unwrap().not_done);

    store.toggle_task(&task.id).unwrap();
    let done = store.get::<Task>(&task.id).unwrap();
    assert!(done.completed);
    assert!(!done.not_done);
}

#[test]
fn rollover_marks_only_yesterdays_open_tasks() {
    let clock = Arc::new(ManualClock::at_day(day(2026, 5, 1)));
    let mut store = start(fresh_kv(), &clock, false);

    let missed = store.add(Task::new("missed", Some("2026-05-01"))).unwrap();
    let finished = store.add(Task::new("finished", Some("2026-05-01"))).unwrap();
    store.toggle_task(&finished.id).unwrap();
    let older = store.add(Task::new("older", Some("2026-04-20"))).unwrap();
    let undated = store.add(Task::new("someday", None)).unwrap();

    clock.advance(Duration::days(1));
    let report = store.perform_daily_rollover().unwrap();

    assert!(report.ran);
    assert_eq!(report.marked_task_ids, vec![missed.id.clone()]);
    assert!(store.get::<Task>(&missed.id).unwrap().not_done);
    assert!(!store.get::<Task>(&finished.id).unwrap().not_done);
    assert!(!store.get::<Task>(&older.id).unwrap().not_done);
    assert!(!store.get::<Task>(&undated.id).unwrap().not_done);
    assert_eq!(store.list::<Task>().len(), 4);

    let last = store.pending_changes().last().unwrap();
    assert_eq!(last.data, json!({ "id": missed.id, "notDone": true }));
}

#[test]
fn rollover_runs_once_per_day() {
    let clock = Arc::new(ManualClock::at_day(day(2026, 5, 1)));
    let mut store = start(fresh_kv(), &clock, false);
    store.add(Task::new("missed", Some("2026-05-01"))).unwrap();

    clock.advance(Duration::days(1));
    assert!(store.perform_daily_rollover().unwrap().ran);
    let queued = store.pending_changes().len();

    let second = store.perform_daily_rollover().unwrap();
    assert!(!second.ran);
    assert!(second.marked_task_ids.is_empty());
    assert_eq!(store.pending_changes().len(), queued);
}

#[test]
fn initialize_runs_rollover_and_records_marker() {
    let clock = Arc::new(ManualClock::at_day(day(2026, 5, 1)));
    let mut store = start(fresh_kv(), &clock, false);
    let task = store.add(Task::new("missed", Some("2026-05-01"))).unwrap();
    let kv = store.shutdown();

    clock.advance(Duration::days(1));
    let store = start(kv, &clock, true);
    assert!(store.get::<Task>(&task.id).unwrap().not_done);

    let kv = store.shutdown();
    assert_eq!(kv.get("lastRolloverDate").unwrap(), Some(json!("2026-05-02")));
}
