//! Pending-change queue and spreadsheet sync.
//!
//! # Responsibility
//! - Track local mutations until a bulk push succeeds.
//! - Map collections to remote tabs and run push/pull through a backend SPI.
//!
//! # Invariants
//! - Sync never mutates collections unless a pull completes.
//! - Backend errors are values (`SheetError`), never panics.

pub mod backend;
pub mod google_sheets;
pub mod memory_backend;
pub mod pending;
pub mod sheet_schema;
pub mod sheet_sync;
pub mod status;
