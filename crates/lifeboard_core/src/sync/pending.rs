//! Queue of local mutations awaiting remote sync.
//!
//! # Invariants
//! - Append-only until a flush succeeds, then cleared wholesale.
//! - Persisted under `pendingChanges` after every append and clear.

use crate::model::collection::CollectionKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Add,
    Update,
    Delete,
    HabitToggle,
}

/// One queued mutation descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub collection: CollectionKind,
    pub data: Value,
    /// RFC 3339 enqueue time.
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingQueue {
    changes: Vec<PendingChange>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_changes(changes: Vec<PendingChange>) -> Self {
        Self { changes }
    }

    pub fn push(&mut self, change: PendingChange) {
        self.changes.push(change);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[PendingChange] {
        &self.changes
    }

    /// Collections touched by queued changes, in first-touch order.
    pub fn dirty_collections(&self) -> Vec<CollectionKind> {
        let mut dirty = Vec::new();
        for change in &self.changes {
            if !dirty.contains(&change.collection) {
                dirty.push(change.collection);
            }
        }
        dirty
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    pub fn to_document(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.changes)
    }
}
