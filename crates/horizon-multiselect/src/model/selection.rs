//! Ordered, duplicate-free selection state with an optional capacity.

use serde::{Deserialize, Serialize};

/// Result of attempting to add a value to a [`SelectionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The value was appended.
    Inserted,
    /// The value was already selected; nothing changed.
    AlreadySelected,
    /// The selection is full; nothing changed.
    AtCapacity,
}

/// The set of selected values, kept in selection order.
///
/// A capacity of `0` means unlimited. The state never holds duplicates and
/// never grows beyond a non-zero capacity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    values: Vec<String>,
    capacity: usize,
}

impl SelectionState {
    /// Create an empty selection with the given capacity (`0` = unlimited).
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Vec::new(),
            capacity,
        }
    }

    /// The selected values in selection order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// An owned copy of the selected values.
    pub fn snapshot(&self) -> Vec<String> {
        self.values.clone()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The configured capacity (`0` = unlimited).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Whether a bounded selection has reached its capacity.
    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.values.len() >= self.capacity
    }

    /// Remaining slots, or `None` when unlimited.
    pub fn free_slots(&self) -> Option<usize> {
        (self.capacity > 0).then(|| self.capacity.saturating_sub(self.values.len()))
    }

    /// Append `value` unless it is already present or the selection is full.
    pub fn insert(&mut self, value: impl Into<String>) -> InsertOutcome {
        let value = value.into();
        if self.contains(&value) {
            InsertOutcome::AlreadySelected
        } else if self.is_full() {
            InsertOutcome::AtCapacity
        } else {
            self.values.push(value);
            InsertOutcome::Inserted
        }
    }

    /// Remove `value`. Returns `true` if it was selected.
    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.values.len();
        self.values.retain(|v| v != value);
        self.values.len() != before
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
