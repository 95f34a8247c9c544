//! Runtime configuration.
//!
//! # Responsibility
//! - Parse the host-provided JSON config and apply environment overrides.
//! - Resolve derived paths (database file, log directory).
//!
//! # Invariants
//! - A validated config always has an absolute `data_dir` and a bare
//!   `db_file_name`.
//! - Unknown JSON fields are rejected.

use crate::logging::{default_log_level, normalize_level};
use crate::sync::backend::SheetAuthRequest;
use crate::sync::google_sheets::DEFAULT_API_BASE_URL;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DATA_DIR: &str = "LIFEBOARD_DATA_DIR";
pub const ENV_LOG_LEVEL: &str = "LIFEBOARD_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "lifeboard.sqlite3";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(String),
    Invalid { field: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(message) => write!(f, "invalid config JSON: {message}"),
            Self::Invalid { field, message } => write!(f, "invalid config `{field}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Directory holding the database and, by default, the logs.
    pub data_dir: PathBuf,
    pub db_file_name: String,
    /// Falls back to `logging::default_log_level()`.
    pub log_level: Option<String>,
    /// Falls back to `<data_dir>/logs`.
    pub log_dir: Option<PathBuf>,
    pub start_online: bool,
    /// Flat JSON export of a previous install, imported once on first open.
    pub legacy_export_path: Option<PathBuf>,
    /// Remote sync; absent means local-only.
    pub sheets: Option<SheetsConfig>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
            log_level: None,
            log_dir: None,
            start_online: true,
            legacy_export_path: None,
            sheets: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetsConfig {
    /// Spreadsheet to bind on sign-in; a new one is created when absent.
    pub spreadsheet_id: Option<String>,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl SheetsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds a sign-in request bound to the configured spreadsheet.
    pub fn auth_request(&self, email: &str, access_token: &str) -> SheetAuthRequest {
        SheetAuthRequest {
            email: email.to_string(),
            access_token: access_token.to_string(),
            spreadsheet_id: self.spreadsheet_id.clone(),
        }
    }
}

impl CoreConfig {
    /// Config rooted at `data_dir` with every other field defaulted.
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Applies `LIFEBOARD_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides resolved through `lookup`; blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(data_dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(data_dir.trim());
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = Some(level.trim().to_string());
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return invalid("data_dir", "cannot be empty");
        }
        if !self.data_dir.is_absolute() {
            return invalid("data_dir", "must be an absolute path");
        }

        let file_name = self.db_file_name.trim();
        if file_name.is_empty() {
            return invalid("db_file_name", "cannot be empty");
        }
        if file_name.contains(['/', '\\']) {
            return invalid("db_file_name", "must be a bare file name");
        }

        if let Some(level) = &self.log_level {
            normalize_level(level).map_err(|message| ConfigError::Invalid {
                field: "log_level",
                message,
            })?;
        }
        if self.log_dir.as_ref().is_some_and(|dir| !dir.is_absolute()) {
            return invalid("log_dir", "must be an absolute path");
        }

        if let Some(sheets) = &self.sheets {
            if sheets.api_base_url.trim().is_empty() {
                return invalid("sheets.api_base_url", "cannot be empty");
            }
            if sheets.request_timeout_secs == 0 {
                return invalid("sheets.request_timeout_secs", "must be positive");
            }
        }
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(self.db_file_name.trim())
    }

    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("logs"))
    }

    pub fn resolved_log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(default_log_level())
    }
}

fn invalid(field: &'static str, message: &str) -> ConfigResult<()> {
    Err(ConfigError::Invalid {
        field,
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DATA_DIR, ENV_LOG_LEVEL};
    use std::path::PathBuf;

    #[test]
    fn minimal_json_fills_defaults() {
        let config = CoreConfig::from_json_str(r#"{"data_dir": "/var/lib/lifeboard"}"#).unwrap();
        assert_eq!(config.db_file_name, "lifeboard.sqlite3");
        assert!(config.start_online);
        assert!(config.sheets.is_none());
        assert_eq!(config.db_path(), PathBuf::from("/var/lib/lifeboard/lifeboard.sqlite3"));
        assert_eq!(config.resolved_log_dir(), PathBuf::from("/var/lib/lifeboard/logs"));
        config.validate().unwrap();
    }

    #[test]
    fn sheets_section_defaults_timeout() {
        let config = CoreConfig::from_json_str(
            r#"{"data_dir": "/data", "sheets": {"spreadsheet_id": "abc"}}"#,
        )
        .unwrap();
        let sheets = config.sheets.as_ref().unwrap();
        assert_eq!(sheets.request_timeout_secs, 30);
        assert_eq!(
            sheets.auth_request("a@b.c", "tok").spreadsheet_id.as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err =
            CoreConfig::from_json_str(r#"{"data_dir": "/data", "colour": "red"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let relative = CoreConfig::for_data_dir("data");
        assert!(matches!(
            relative.validate(),
            Err(ConfigError::Invalid { field: "data_dir", .. })
        ));

        let mut nested_file = CoreConfig::for_data_dir("/data");
        nested_file.db_file_name = "db/store.sqlite3".to_string();
        assert!(matches!(
            nested_file.validate(),
            Err(ConfigError::Invalid { field: "db_file_name", .. })
        ));

        let mut loud = CoreConfig::for_data_dir("/data");
        loud.log_level = Some("shout".to_string());
        assert!(matches!(
            loud.validate(),
            Err(ConfigError::Invalid { field: "log_level", .. })
        ));
    }

    #[test]
    fn overrides_replace_data_dir_and_level_but_skip_blanks() {
        let mut config = CoreConfig::for_data_dir("/data");
        config.apply_overrides(|name| match name {
            ENV_DATA_DIR => Some(" /override ".to_string()),
            ENV_LOG_LEVEL => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.data_dir, PathBuf::from("/override"));
        assert!(config.log_level.is_none());
    }

    #[test]
    fn from_json_file_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = CoreConfig::from_json_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
