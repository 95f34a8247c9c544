//! Store-level error and mutation outcome types.

use crate::model::record::RecordValidationError;
use crate::repo::kv_store::KvError;
use crate::sync::backend::SheetError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of a mutation addressed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// No record with that id exists; nothing was persisted or queued.
    NotFound,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// Local persistence failed.
    Kv(KvError),
    /// Record rejected at the store boundary.
    Validation(RecordValidationError),
    /// Persisted or in-memory state could not be (de)serialized.
    Serialization { key: String, message: String },
    /// Remote call failed where the caller asked to see the error (sign-in).
    Sync(SheetError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kv(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Serialization { key, message } => {
                write!(f, "invalid state for `{key}`: {message}")
            }
            Self::Sync(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Kv(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Serialization { .. } => None,
            Self::Sync(err) => Some(err),
        }
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

impl From<RecordValidationError> for StoreError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SheetError> for StoreError {
    fn from(value: SheetError) -> Self {
        Self::Sync(value)
    }
}

impl StoreError {
    pub(crate) fn serialization(key: &str, err: &serde_json::Error) -> Self {
        Self::Serialization {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}
