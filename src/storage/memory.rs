//! In-memory history store.

use crate::core::HistoryEntry;
use crate::error::{Result, StorageError};
use crate::storage::traits::{DEFAULT_HISTORY_CAPACITY, HistoryStore};
use std::collections::VecDeque;

/// History kept in process memory, lost when dropped.
///
/// # Examples
///
/// ```
/// use fleetmux::core::HistoryEntry;
/// use fleetmux::storage::{HistoryStore, MemoryHistory};
///
/// let mut history = MemoryHistory::with_capacity(2);
/// for topic in ["a", "b", "c"] {
///     history.push(HistoryEntry::new(topic, "", "Beginner", "1 hour")).unwrap();
/// }
/// let topics: Vec<_> = history.list().unwrap().into_iter().map(|e| e.topic).collect();
/// assert_eq!(topics, ["c", "b"]);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl MemoryHistory {
    /// Creates an empty store with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Creates an empty store keeping at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for MemoryHistory {
    fn push(&mut self, entry: HistoryEntry) -> Result<()> {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        Ok(())
    }

    fn list(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.entries.iter().cloned().collect())
    }

    fn get(&self, index: usize) -> Result<HistoryEntry> {
        self.entries
            .get(index)
            .cloned()
            .ok_or_else(|| StorageError::EntryNotFound { index }.into())
    }

    fn clear(&mut self) -> Result<usize> {
        let removed = self.entries.len();
        self.entries.clear();
        Ok(removed)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.len())
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
