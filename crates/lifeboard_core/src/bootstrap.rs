//! Opens a ready-to-use store from a `CoreConfig`.
//!
//! # Responsibility
//! - Wire config, logging, storage, legacy import and the sync backend.
//!
//! # Invariants
//! - The legacy export is imported at most once per database.
//! - Without a `sheets` section the store runs local-only.
//! - Environment overrides apply only through `open_store`.

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, CoreConfig};
use crate::db::{open_db, DbError};
use crate::logging::init_logging;
use crate::repo::kv_store::{KeyValueStore, KvError, SqliteKeyValueStore};
use crate::repo::legacy_import::{load_legacy_entries, LegacyImportError};
use crate::service::error::StoreError;
use crate::service::store::{LifeStore, StoreDeps, StoreOptions};
use crate::sync::backend::{SheetBackend, SheetError};
use crate::sync::google_sheets::GoogleSheetsBackend;
use crate::sync::memory_backend::InMemorySheetBackend;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

pub type BootstrapResult<T> = Result<T, BootstrapError>;

#[derive(Debug)]
pub enum BootstrapError {
    Config(ConfigError),
    Logging(String),
    DataDir { path: PathBuf, source: std::io::Error },
    Db(DbError),
    Kv(KvError),
    Legacy(LegacyImportError),
    Sheet(SheetError),
    Store(StoreError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::DataDir { path, source } => write!(
                f,
                "failed to create data directory `{}`: {source}",
                path.display()
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::Kv(err) => write!(f, "{err}"),
            Self::Legacy(err) => write!(f, "{err}"),
            Self::Sheet(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(_) => None,
            Self::DataDir { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::Kv(err) => Some(err),
            Self::Legacy(err) => Some(err),
            Self::Sheet(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ConfigError> for BootstrapError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for BootstrapError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<KvError> for BootstrapError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

impl From<LegacyImportError> for BootstrapError {
    fn from(value: LegacyImportError) -> Self {
        Self::Legacy(value)
    }
}

impl From<SheetError> for BootstrapError {
    fn from(value: SheetError) -> Self {
        Self::Sheet(value)
    }
}

impl From<StoreError> for BootstrapError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Google Sheets backend when configured, otherwise a signed-out in-memory one.
pub fn backend_from_config(config: &CoreConfig) -> BootstrapResult<Arc<dyn SheetBackend>> {
    match &config.sheets {
        Some(sheets) => Ok(Arc::new(GoogleSheetsBackend::new(
            sheets.api_base_url.clone(),
            sheets.request_timeout(),
        )?)),
        None => Ok(Arc::new(InMemorySheetBackend::new())),
    }
}

/// Opens the store described by `config`, with `LIFEBOARD_*` environment
/// overrides applied, the wall clock and the configured backend. Starts file
/// logging as a side effect.
pub fn open_store(config: &CoreConfig) -> BootstrapResult<LifeStore<SqliteKeyValueStore>> {
    let mut config = config.clone();
    config.apply_env();
    config.validate()?;
    let log_dir = config.resolved_log_dir();
    init_logging(config.resolved_log_level(), &log_dir.to_string_lossy())
        .map_err(BootstrapError::Logging)?;

    let backend = backend_from_config(&config)?;
    open_store_with(&config, backend, Arc::new(SystemClock))
}

/// Opens the store without touching global logging.
pub fn open_store_with(
    config: &CoreConfig,
    backend: Arc<dyn SheetBackend>,
    clock: Arc<dyn Clock>,
) -> BootstrapResult<LifeStore<SqliteKeyValueStore>> {
    config.validate()?;
    std::fs::create_dir_all(&config.data_dir).map_err(|source| BootstrapError::DataDir {
        path: config.data_dir.clone(),
        source,
    })?;

    let conn = open_db(config.db_path())?;
    let mut kv = SqliteKeyValueStore::try_new(conn)?;
    import_legacy_once(&mut kv, config)?;

    let options = StoreOptions {
        start_online: config.start_online,
        ..StoreOptions::default()
    };
    let store = LifeStore::initialize(StoreDeps { kv, backend, clock }, options)?;
    info!(
        "event=bootstrap module=core status=ok sheets={} start_online={}",
        config.sheets.is_some(),
        config.start_online
    );
    Ok(store)
}

fn import_legacy_once(kv: &mut SqliteKeyValueStore, config: &CoreConfig) -> BootstrapResult<()> {
    if !kv.needs_migration()? {
        return Ok(());
    }

    let entries = match &config.legacy_export_path {
        Some(path) if path.exists() => load_legacy_entries(path)?,
        Some(_) => {
            warn!("event=legacy_import module=core status=skip reason=missing_file");
            Vec::new()
        }
        None => Vec::new(),
    };
    // An empty import still sets the marker so later opens skip the probe.
    let copied = kv.migrate(&entries)?;
    info!(
        "event=legacy_import module=core status=ok entries={} copied={}",
        entries.len(),
        copied
    );
    Ok(())
}
