//! Shared record contract and boundary validation.
//!
//! # Invariants
//! - `id` is assigned once by the store and never rewritten.
//! - Records are validated before they enter a collection, both on `add`
//!   and after a patch is merged on `update`.

use crate::model::collection::CollectionKind;
use crate::model::collections::Collections;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));
static CLOCK_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time regex"));

/// Calendar date format used by records and habit history keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation failures raised at the store boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValidationError {
    /// A required text field is blank.
    EmptyField {
        collection: CollectionKind,
        field: &'static str,
    },
    /// Value is not a real `YYYY-MM-DD` date.
    InvalidDate { field: &'static str, value: String },
    /// Value is not a 24h `HH:MM` time.
    InvalidTime { field: &'static str, value: String },
    /// Numeric value is NaN/infinite or outside its allowed range.
    OutOfRange { field: &'static str, value: f64 },
    /// Value is not one of the accepted choices.
    InvalidChoice { field: &'static str, value: String },
    /// Merged patch no longer describes a valid record.
    MalformedPatch {
        collection: CollectionKind,
        message: String,
    },
    /// Patch tried to rewrite identity fields.
    ImmutableField(&'static str),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { collection, field } => {
                write!(f, "{collection}.{field} cannot be empty")
            }
            Self::InvalidDate { field, value } => {
                write!(f, "{field} must be a YYYY-MM-DD date, got `{value}`")
            }
            Self::InvalidTime { field, value } => {
                write!(f, "{field} must be an HH:MM time, got `{value}`")
            }
            Self::OutOfRange { field, value } => write!(f, "{field} is out of range: {value}"),
            Self::InvalidChoice { field, value } => {
                write!(f, "{field} has unsupported value `{value}`")
            }
            Self::MalformedPatch {
                collection,
                message,
            } => write!(f, "patch for {collection} is malformed: {message}"),
            Self::ImmutableField(field) => write!(f, "{field} cannot be changed"),
        }
    }
}

impl Error for RecordValidationError {}

/// One record type stored in a named collection.
pub trait CollectionRecord: Clone + Serialize + DeserializeOwned {
    const KIND: CollectionKind;

    fn id(&self) -> &str;
    fn created_at(&self) -> Option<&str>;
    /// Stamps identity on a freshly added record.
    fn assign_identity(&mut self, id: String, created_at: String);
    fn set_updated_at(&mut self, updated_at: String);
    fn validate(&self) -> Result<(), RecordValidationError>;

    fn slot(collections: &Collections) -> &Vec<Self>;
    fn slot_mut(collections: &mut Collections) -> &mut Vec<Self>;
}

/// Implements the identity plumbing of `CollectionRecord` for a record struct.
///
/// The struct must carry `id`, `created_at` and `updated_at` fields and an
/// inherent `check(&self)` validator.
macro_rules! collection_record {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl $crate::model::record::CollectionRecord for $ty {
            const KIND: $crate::model::collection::CollectionKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> Option<&str> {
                self.created_at.as_deref()
            }

            fn assign_identity(&mut self, id: String, created_at: String) {
                self.id = id;
                self.created_at = Some(created_at);
                self.updated_at = None;
            }

            fn set_updated_at(&mut self, updated_at: String) {
                self.updated_at = Some(updated_at);
            }

            fn validate(&self) -> Result<(), $crate::model::record::RecordValidationError> {
                self.check()
            }

            fn slot(collections: &$crate::model::collections::Collections) -> &Vec<Self> {
                &collections.$field
            }

            fn slot_mut(
                collections: &mut $crate::model::collections::Collections,
            ) -> &mut Vec<Self> {
                &mut collections.$field
            }
        }
    };
}

pub(crate) use collection_record;

pub(crate) fn require_text(
    collection: CollectionKind,
    field: &'static str,
    value: &str,
) -> Result<(), RecordValidationError> {
    if value.trim().is_empty() {
        return Err(RecordValidationError::EmptyField { collection, field });
    }
    Ok(())
}

pub(crate) fn check_date(field: &'static str, value: &str) -> Result<(), RecordValidationError> {
    if is_calendar_date(value) {
        return Ok(());
    }
    Err(RecordValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

pub(crate) fn check_optional_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), RecordValidationError> {
    match value {
        Some(value) if !value.is_empty() => check_date(field, value),
        _ => Ok(()),
    }
}

pub(crate) fn check_clock_time(
    field: &'static str,
    value: &str,
) -> Result<(), RecordValidationError> {
    if CLOCK_TIME_RE.is_match(value) {
        return Ok(());
    }
    Err(RecordValidationError::InvalidTime {
        field,
        value: value.to_string(),
    })
}

pub(crate) fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), RecordValidationError> {
    if value.is_finite() && value >= min && value <= max {
        return Ok(());
    }
    Err(RecordValidationError::OutOfRange { field, value })
}

pub(crate) fn check_choice(
    field: &'static str,
    value: &str,
    choices: &[&str],
) -> Result<(), RecordValidationError> {
    if choices.contains(&value) {
        return Ok(());
    }
    Err(RecordValidationError::InvalidChoice {
        field,
        value: value.to_string(),
    })
}

/// Returns whether `value` is a strict `YYYY-MM-DD` calendar date.
pub fn is_calendar_date(value: &str) -> bool {
    DATE_RE.is_match(value) && NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
}
