//! Key-value store contract and SQLite implementation.
//!
//! # Responsibility
//! - Hold one JSON value per named key (`tasks`, `habitHistory`, `darkMode`, ...).
//! - Import flat legacy key/value exports exactly once.
//!
//! # Invariants
//! - `set` stores every value as JSON text, strings included, so `get`
//!   returns exactly what was set.
//! - Legacy rows written by `migrate` keep their raw text; text that does not
//!   parse as JSON comes back as `Value::String`.
//! - After a successful `migrate`, further calls are no-ops.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

const LEGACY_MIGRATION_MARKER: &str = "legacy_migration_v1";

pub type KvResult<T> = Result<T, KvError>;

/// Errors surfaced by key-value persistence.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    /// Key is empty or whitespace-only.
    InvalidKey(String),
    /// Value could not be encoded for storage.
    Serialization { key: String, message: String },
    /// Connection has not been migrated to the schema this store expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key `{key}`"),
            Self::Serialization { key, message } => {
                write!(f, "failed to encode value for `{key}`: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "key-value store requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key-value persistence used by the store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<Value>>;
    fn set(&self, key: &str, value: &Value) -> KvResult<()>;
    fn remove(&self, key: &str) -> KvResult<()>;
    /// Returns all stored keys in ascending order.
    fn keys(&self) -> KvResult<Vec<String>>;
    /// Imports legacy string pairs; returns how many entries were written.
    fn migrate(&mut self, legacy_entries: &[(String, String)]) -> KvResult<usize>;
    fn needs_migration(&self) -> KvResult<bool>;
}

/// SQLite-backed key-value store.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    pub fn try_new(conn: Connection) -> KvResult<Self> {
        let actual_version = current_version(&conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(KvError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<Value>> {
        let key = normalize_key(key)?;
        let raw = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(raw.map(|text| decode_value(key, text)))
    }

    fn set(&self, key: &str, value: &Value) -> KvResult<()> {
        let key = normalize_key(key)?;
        let encoded = encode_value(key, value)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, encoded],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        let key = normalize_key(key)?;
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn migrate(&mut self, legacy_entries: &[(String, String)]) -> KvResult<usize> {
        if !self.needs_migration()? {
            info!("event=kv_migrate module=repo status=skip reason=already_migrated");
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut imported = 0usize;
        for (key, raw) in legacy_entries {
            let trimmed = key.trim();
            if trimmed.is_empty() {
                warn!("event=kv_migrate module=repo status=skip reason=empty_key");
                continue;
            }
            tx.execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![trimmed, raw],
            )?;
            imported += 1;
        }
        tx.execute(
            "INSERT OR REPLACE INTO kv_meta (name, value) VALUES (?1, ?2);",
            params![LEGACY_MIGRATION_MARKER, imported.to_string()],
        )?;
        tx.commit()?;

        info!("event=kv_migrate module=repo status=ok imported={imported}");
        Ok(imported)
    }

    fn needs_migration(&self) -> KvResult<bool> {
        let marker = self
            .conn
            .query_row(
                "SELECT value FROM kv_meta WHERE name = ?1;",
                [LEGACY_MIGRATION_MARKER],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(marker.is_none())
    }
}

fn normalize_key(key: &str) -> KvResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(KvError::InvalidKey(key.to_string()));
    }
    Ok(trimmed)
}

fn encode_value(key: &str, value: &Value) -> KvResult<String> {
    serde_json::to_string(value).map_err(|err| KvError::Serialization {
        key: key.to_string(),
        message: err.to_string(),
    })
}

fn decode_value(key: &str, text: String) -> Value {
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => value,
        Err(_) => {
            // Legacy raw scalars (`userEmail`) land here; only
            // structured-looking text indicates corruption.
            if text.starts_with('{') || text.starts_with('[') {
                warn!("event=kv_decode module=repo status=fallback key={key} reason=invalid_json");
            }
            Value::String(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_value, encode_value};
    use serde_json::{json, Value};

    #[test]
    fn strings_are_json_quoted() {
        let encoded = encode_value("userEmail", &json!("me@example.com")).unwrap();
        assert_eq!(encoded, r#""me@example.com""#);
        let encoded = encode_value("userSheetId", &json!("1e3")).unwrap();
        assert_eq!(decode_value("userSheetId", encoded), json!("1e3"));
    }

    #[test]
    fn structured_values_are_json_encoded() {
        let encoded = encode_value("tasks", &json!([{"id": "1"}])).unwrap();
        assert_eq!(encoded, r#"[{"id":"1"}]"#);
    }

    #[test]
    fn decode_falls_back_to_raw_string() {
        assert_eq!(
            decode_value("userEmail", "me@example.com".to_string()),
            Value::String("me@example.com".to_string())
        );
        assert_eq!(
            decode_value("tasks", "[broken".to_string()),
            Value::String("[broken".to_string())
        );
    }

    #[test]
    fn decode_parses_scalars_and_documents() {
        assert_eq!(decode_value("darkMode", "true".to_string()), json!(true));
        assert_eq!(
            decode_value("habitHistory", r#"{"1":{"2024-01-01":true}}"#.to_string()),
            json!({"1": {"2024-01-01": true}})
        );
    }
}
