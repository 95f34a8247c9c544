//! SQLite storage bootstrap for the local key-value store.
//!
//! # Responsibility
//! - Open file or in-memory connections with the pragmas core relies on.
//! - Bring the schema up to date before any key is read or written.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A database written by a newer build is rejected, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The database could not be opened at `target` (a path or `:memory:`).
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// Pragma, migration or query failure on an open connection.
    Sqlite(rusqlite::Error),
    /// The file was last written by a build with a newer schema.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "cannot open store database `{target}`: {source}")
            }
            Self::Sqlite(err) => write!(f, "store database error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "store database uses schema {found} but this build reads up to {supported}; \
                 refusing to downgrade"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Sqlite(source) => Some(source),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
