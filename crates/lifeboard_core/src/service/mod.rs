//! Store-level use cases.
//!
//! # Responsibility
//! - Expose every domain operation as a method on `LifeStore`.
//! - Keep storage and sync details behind the store boundary.
//!
//! # Invariants
//! - Every successful mutation is persisted and queued before returning.

pub mod error;
pub mod habits;
pub mod reminders;
pub mod store;
pub mod sync_control;
pub mod tasks;
