use lifeboard_core::db::open_db_in_memory;
use lifeboard_core::repo::legacy_import::{load_legacy_entries, LegacyImportError};
use lifeboard_core::{KeyValueStore, KvError, SqliteKeyValueStore};
use serde_json::json;

fn open_kv() -> SqliteKeyValueStore {
    SqliteKeyValueStore::try_new(open_db_in_memory().unwrap()).unwrap()
}

#[test]
fn set_get_remove_roundtrip() {
    let kv = open_kv();

    kv.set("tasks", &json!([{ "id": "1", "text": "buy milk" }]))
        .unwrap();
    kv.set("userEmail", &json!("me@example.com")).unwrap();
    kv.set("darkMode", &json!(true)).unwrap();

    assert_eq!(
        kv.get("tasks").unwrap(),
        Some(json!([{ "id": "1", "text": "buy milk" }]))
    );
    assert_eq!(kv.get("userEmail").unwrap(), Some(json!("me@example.com")));
    assert_eq!(kv.get("darkMode").unwrap(), Some(json!(true)));
    assert_eq!(kv.keys().unwrap(), vec!["darkMode", "tasks", "userEmail"]);

    kv.remove("tasks").unwrap();
    assert_eq!(kv.get("tasks").unwrap(), None);
    kv.remove("tasks").expect("removing a missing key is not an error");
}

#[test]
fn set_overwrites_previous_value() {
    let kv = open_kv();
    kv.set("quotes", &json!([])).unwrap();
    kv.set("quotes", &json!([{ "id": "7" }])).unwrap();

    assert_eq!(kv.get("quotes").unwrap(), Some(json!([{ "id": "7" }])));
    assert_eq!(kv.keys().unwrap().len(), 1);
}

#[test]
fn scalar_looking_strings_keep_their_type() {
    let kv = open_kv();
    for text in ["123", "true", "null", "1e3", "{", ""] {
        kv.set("userSheetId", &json!(text)).unwrap();
        assert_eq!(kv.get("userSheetId").unwrap(), Some(json!(text)), "{text:?}");
    }
}

#[test]
fn blank_keys_are_rejected() {
    let kv = open_kv();
    let err = kv.set("  ", &json!(1)).unwrap_err();
    assert!(matches!(err, KvError::InvalidKey(_)));
}

#[test]
fn migrate_imports_once_and_sets_marker() {
    let mut kv = open_kv();
    assert!(kv.needs_migration().unwrap());

    let entries = vec![
        ("darkMode".to_string(), "true".to_string()),
        ("tasks".to_string(), r#"[{"id":"1","text":"old"}]"#.to_string()),
        ("userSheetId".to_string(), "sheet-123".to_string()),
    ];
    assert_eq!(kv.migrate(&entries).unwrap(), 3);
    assert!(!kv.needs_migration().unwrap());

    assert_eq!(kv.get("darkMode").unwrap(), Some(json!(true)));
    assert_eq!(kv.get("userSheetId").unwrap(), Some(json!("sheet-123")));
    assert_eq!(
        kv.get("tasks").unwrap(),
        Some(json!([{ "id": "1", "text": "old" }]))
    );

    kv.set("darkMode", &json!(false)).unwrap();
    assert_eq!(kv.migrate(&entries).unwrap(), 0);
    assert_eq!(kv.get("darkMode").unwrap(), Some(json!(false)));
}

#[test]
fn legacy_file_feeds_migration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    std::fs::write(
        &path,
        r#"{"userEmail":"me@example.com","streakData":{"best":4},"notes":"[]"}"#,
    )
    .unwrap();

    let entries = load_legacy_entries(&path).unwrap();
    let keys = entries.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>();
    assert_eq!(keys, vec!["notes", "streakData", "userEmail"]);

    let mut kv = open_kv();
    kv.migrate(&entries).unwrap();
    assert_eq!(kv.get("streakData").unwrap(), Some(json!({ "best": 4 })));
    assert_eq!(kv.get("notes").unwrap(), Some(json!([])));
}

#[test]
fn legacy_file_must_be_a_json_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let err = load_legacy_entries(&path).unwrap_err();
    assert!(matches!(err, LegacyImportError::NotAnObject(_)));
}
