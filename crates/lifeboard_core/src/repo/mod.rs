//! Persistence layer: key-value contract and its SQLite implementation.
//!
//! # Responsibility
//! - Hide SQL details behind `KeyValueStore`.
//! - Provide the one-shot legacy import path.
//!
//! # Invariants
//! - Every collection is rewritten in full under its key; nothing is patched.

pub mod kv_store;
pub mod legacy_import;
