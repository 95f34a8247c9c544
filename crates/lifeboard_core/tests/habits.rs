use chrono::{Duration, NaiveDate};
use lifeboard_core::db::open_db_in_memory;
use lifeboard_core::service::habits::HabitDayToggle;
use lifeboard_core::sync::memory_backend::InMemorySheetBackend;
use lifeboard_core::{
    Habit, KeyValueStore, LifeStore, ManualClock, RecordValidationError, SqliteKeyValueStore,
    StoreDeps, StoreError, StoreOptions,
};
use serde_json::json;
use std::sync::Arc;

fn open_store(clock: &Arc<ManualClock>) -> LifeStore<SqliteKeyValueStore> {
    let kv = SqliteKeyValueStore::try_new(open_db_in_memory().unwrap()).unwrap();
    LifeStore::initialize(
        StoreDeps {
            kv,
            backend: Arc::new(InMemorySheetBackend::new()),
            clock: clock.clone(),
        },
        StoreOptions::default(),
    )
    .unwrap()
}

fn june(date: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, date).unwrap()
}

#[test]
fn toggling_twice_restores_history() {
    let clock = Arc::new(ManualClock::at_day(june(10)));
    let mut store = open_store(&clock);
    let habit = store.add(Habit::new("read")).unwrap();

    assert_eq!(
        store.toggle_habit_day(&habit.id, "2026-06-10").unwrap(),
        HabitDayToggle::Marked
    );
    assert!(store.habit_history().is_done(&habit.id, "2026-06-10"));
    assert!(store.habit_done_today(&habit.id));

    assert_eq!(
        store.toggle_habit_day(&habit.id, "2026-06-10").unwrap(),
        HabitDayToggle::Cleared
    );
    assert!(store.habit_history().is_empty());

    let last = store.pending_changes().last().unwrap();
    assert_eq!(
        last.data,
        json!({ "habitId": habit.id, "date": "2026-06-10", "completed": false })
    );
}

#[test]
fn toggle_rejects_unknown_habit_and_bad_date() {
    let clock = Arc::new(ManualClock::at_day(june(10)));
    let mut store = open_store(&clock);
    let habit = store.add(Habit::new("run")).unwrap();

    assert_eq!(
        store.toggle_habit_day("missing", "2026-06-10").unwrap(),
        HabitDayToggle::HabitNotFound
    );
    let err = store.toggle_habit_day(&habit.id, "06/10/2026").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(RecordValidationError::InvalidDate { .. })
    ));
    assert!(store.habit_history().is_empty());
}

#[test]
fn deleting_a_habit_removes_only_its_history() {
    let clock = Arc::new(ManualClock::at_day(june(10)));
    let mut store = open_store(&clock);
    let kept = store.add(Habit::new("meditate")).unwrap();
    let dropped = store.add(Habit::new("journal")).unwrap();
    store.toggle_habit_day(&kept.id, "2026-06-09").unwrap();
    store.toggle_habit_day(&dropped.id, "2026-06-09").unwrap();
    store.toggle_habit_day(&dropped.id, "2026-06-10").unwrap();

    assert!(store.delete_habit(&dropped.id).unwrap().is_applied());

    assert_eq!(store.list::<Habit>().len(), 1);
    assert!(store.habit_history().days(&dropped.id).is_empty());
    assert_eq!(store.habit_history().days(&kept.id), vec!["2026-06-09"]);

    let kv = store.shutdown();
    let persisted = kv.get("habitHistory").unwrap().unwrap();
    assert!(persisted.get(&dropped.id).is_none());
    assert_eq!(persisted[&kept.id]["2026-06-09"], json!(true));
}

#[test]
fn streak_counts_consecutive_days_up_to_today() {
    let clock = Arc::new(ManualClock::at_day(june(12)));
    let mut store = open_store(&clock);
    let habit = store.add(Habit::new("walk")).unwrap();
    for date in ["2026-06-08", "2026-06-10", "2026-06-11", "2026-06-12"] {
        store.toggle_habit_day(&habit.id, date).unwrap();
    }
    assert_eq!(store.habit_streak(&habit.id), 3);

    clock.advance(Duration::days(2));
    assert_eq!(store.habit_streak(&habit.id), 0);
}
