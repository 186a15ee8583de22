#![forbid(unsafe_code)]

//! Snapshot-based undo/redo history.
//!
//! [`SnapshotHistory`] keeps an ordered sequence of immutable [`Arc`]
//! snapshots plus a cursor marking the current one. Undo and redo only move
//! the cursor; pushing from a cursor behind the tip discards the redo tail
//! first.
//!
//! ```text
//! push(s3)
//! ┌────────────────────────────────────────────┐
//! │ Entries: [s0, s1, s2, s3]   cursor -> s3   │
//! └────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌────────────────────────────────────────────┐
//! │ Entries: [s0, s1, s2, s3]   cursor -> s1   │
//! └────────────────────────────────────────────┘
//!
//! push(s4) (new branch, redo tail dropped)
//! ┌────────────────────────────────────────────┐
//! │ Entries: [s0, s1, s4]       cursor -> s4   │
//! └────────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

/// Configuration for the history.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct HistoryConfig {
    /// Maximum number of snapshots retained, current one included.
    /// Oldest snapshots are evicted when this limit is exceeded.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

impl HistoryConfig {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Never evict (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

/// Undo/redo over immutable snapshots.
///
/// # Invariants
///
/// 1. `cursor < entries.len()` whenever `entries` is non-empty.
/// 2. `entries.len() <= max(config.max_depth, 1)` after any operation.
/// 3. Entries after the cursor are exactly the redo tail.
/// 4. No two adjacent entries compare equal.
pub struct SnapshotHistory<T> {
    entries: VecDeque<Arc<T>>,
    cursor: usize,
    config: HistoryConfig,
}

impl<T: fmt::Debug> fmt::Debug for SnapshotHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotHistory")
            .field("undo_depth", &self.undo_depth())
            .field("redo_depth", &self.redo_depth())
            .field("config", &self.config)
            .finish()
    }
}

impl<T> SnapshotHistory<T> {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            config,
        }
    }

    #[must_use]
    pub fn with_default_config() -> Self {
        Self::new(HistoryConfig::default())
    }

    /// History whose only entry is `initial`.
    #[must_use]
    pub fn with_initial(initial: T, config: HistoryConfig) -> Self {
        let mut history = Self::new(config);
        history.entries.push_back(Arc::new(initial));
        history
    }

    /// Step back one snapshot and return it.
    ///
    /// Returns `None` at the oldest retained snapshot.
    pub fn undo(&mut self) -> Option<Arc<T>> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.current().cloned()
    }

    /// Step forward one snapshot and return it.
    ///
    /// Returns `None` when nothing has been undone since the last push.
    pub fn redo(&mut self) -> Option<Arc<T>> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.current().cloned()
    }

    /// Snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&Arc<T>> {
        self.entries.get(self.cursor)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of snapshots at or before the cursor.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        if self.entries.is_empty() {
            0
        } else {
            self.cursor + 1
        }
    }

    /// Number of snapshots after the cursor.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.entries.len() - self.undo_depth()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Drop every snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    fn truncate_redo(&mut self) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
    }

    fn append(&mut self, state: Arc<T>) {
        self.truncate_redo();
        self.entries.push_back(state);
        self.cursor = self.entries.len() - 1;
        self.enforce_depth();
    }

    fn enforce_depth(&mut self) {
        let max_depth = self.config.max_depth.max(1);
        while self.entries.len() > max_depth {
            self.entries.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
        }
    }
}

impl<T: PartialEq> SnapshotHistory<T> {
    /// Record a new snapshot after the cursor.
    ///
    /// A snapshot equal to the current one is ignored and `false` is
    /// returned. Otherwise any redo tail is discarded first.
    pub fn push(&mut self, state: T) -> bool {
        self.push_arc(Arc::new(state))
    }

    /// [`push`](Self::push) for an already shared snapshot.
    pub fn push_arc(&mut self, state: Arc<T>) -> bool {
        if self.current().is_some_and(|current| **current == *state) {
            return false;
        }
        self.append(state);
        true
    }
}
