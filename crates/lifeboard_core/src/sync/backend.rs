//! Remote spreadsheet backend contract.
//!
//! # Responsibility
//! - Define the narrow SPI the sync service needs: auth state plus whole-tab
//!   read/write of string cells.
//! - Carry backend failures as a typed envelope with stage and error code.
//!
//! # Invariants
//! - `write_range` replaces the full tab content; row 0 is the header row.
//! - `read_range` returns the header row first when the tab is non-empty.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SheetResult<T> = Result<T, SheetError>;

/// Sync phase a backend error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Auth,
    Push,
    Pull,
}

impl SyncStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Push => "push",
            Self::Pull => "pull",
        }
    }
}

/// Backend failure envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetError {
    pub backend_id: String,
    pub stage: SyncStage,
    /// Stable machine-readable code, e.g. `not_authenticated`.
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl SheetError {
    pub fn new(
        backend_id: impl Into<String>,
        stage: SyncStage,
        code: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            backend_id: backend_id.into(),
            stage,
            code: code.into(),
            message: message.into(),
            retryable,
        }
    }

    pub(crate) fn not_authenticated(backend_id: &str, stage: SyncStage) -> Self {
        Self::new(
            backend_id,
            stage,
            "not_authenticated",
            "Sign in before syncing.",
            false,
        )
    }
}

impl Display for SheetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} failed ({}): {}",
            self.backend_id,
            self.stage.as_str(),
            self.code,
            self.message
        )
    }
}

impl Error for SheetError {}

/// Credentials handed to `authenticate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetAuthRequest {
    pub email: String,
    /// OAuth bearer token obtained by the host application.
    pub access_token: String,
    /// Existing spreadsheet to bind to; backends may create one when absent.
    pub spreadsheet_id: Option<String>,
}

/// Account binding returned by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetAccount {
    pub email: String,
    pub sheet_id: String,
    pub sheet_url: String,
}

/// Remote spreadsheet service used for bulk push/pull.
pub trait SheetBackend: Send + Sync {
    fn backend_id(&self) -> &str;
    fn is_authenticated(&self) -> bool;
    fn authenticate(&self, request: &SheetAuthRequest) -> SheetResult<SheetAccount>;
    fn sign_out(&self);
    /// Overwrites tab `sheet` with `rows`.
    fn write_range(&self, sheet: &str, rows: &[Vec<String>]) -> SheetResult<()>;
    /// Reads every row of tab `sheet`; a missing tab reads as empty.
    fn read_range(&self, sheet: &str) -> SheetResult<Vec<Vec<String>>>;
}
