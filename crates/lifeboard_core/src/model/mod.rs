//! Domain model for the store's collections.
//!
//! # Responsibility
//! - Define one typed record per collection plus the habit history map.
//! - Name every storage key the store touches.
//!
//! # Invariants
//! - Record ids are unique within their collection and never reused.
//! - Habit history entries are keyed by habit id and `YYYY-MM-DD`.

pub mod collection;
pub mod collections;
pub mod habit_history;
pub mod record;
pub mod records;
pub mod settings;
