//! Bounded snapshot stack for single-step undo.

use crate::models::Bout;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Snapshots kept before the oldest is dropped.
pub const HISTORY_LIMIT: usize = 32;

/// Deep-copied bout-list snapshots, recorded before each accepted result
/// submission. Snapshots share no structure with the live list; both are
/// mutated independently afterward.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct History {
    snapshots: VecDeque<Vec<Bout>>,
}

impl History {
    /// Push a snapshot, evicting the oldest once the stack is full.
    pub fn record(&mut self, bouts: &[Bout]) {
        if self.snapshots.len() == HISTORY_LIMIT {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(bouts.to_vec());
    }

    /// Pop the most recent snapshot. No redo: a popped snapshot is gone.
    pub fn undo(&mut self) -> Option<Vec<Bout>> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
