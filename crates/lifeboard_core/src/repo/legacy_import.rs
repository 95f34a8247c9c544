//! Reader for flat legacy storage exports.
//!
//! A legacy export is a JSON object whose members are the old storage keys.
//! String members are taken verbatim; anything else is re-encoded as JSON
//! text so the key-value store sees the same payload the old storage held.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum LegacyImportError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, message: String },
    NotAnObject(PathBuf),
}

impl Display for LegacyImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read legacy export `{}`: {source}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "legacy export `{}` is not valid JSON: {message}", path.display())
            }
            Self::NotAnObject(path) => write!(
                f,
                "legacy export `{}` must be a flat JSON object",
                path.display()
            ),
        }
    }
}

impl Error for LegacyImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Reads legacy key/value pairs from `path`, sorted by key.
pub fn load_legacy_entries(
    path: impl AsRef<Path>,
) -> Result<Vec<(String, String)>, LegacyImportError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LegacyImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_legacy_entries(&text).map_err(|err| match err {
        ParseFailure::Json(message) => LegacyImportError::Parse {
            path: path.to_path_buf(),
            message,
        },
        ParseFailure::NotAnObject => LegacyImportError::NotAnObject(path.to_path_buf()),
    })
}

enum ParseFailure {
    Json(String),
    NotAnObject,
}

fn parse_legacy_entries(text: &str) -> Result<Vec<(String, String)>, ParseFailure> {
    let root: Value =
        serde_json::from_str(text).map_err(|err| ParseFailure::Json(err.to_string()))?;
    let Value::Object(members) = root else {
        return Err(ParseFailure::NotAnObject);
    };

    let mut entries = members
        .into_iter()
        .map(|(key, value)| {
            let raw = match value {
                Value::String(raw) => raw,
                other => other.to_string(),
            };
            (key, raw)
        })
        .collect::<Vec<_>>();
    entries.sort_by(|left, right| left.0.cmp(&right.0));
    Ok(entries)
}
