//! History store trait definition.
//!
//! Defines the interface for history backends: a bounded, append-only list
//! of completed runs, newest first.

use crate::core::HistoryEntry;
use crate::error::{Result, StorageError};

/// Default number of history entries kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Bounded list of completed runs.
///
/// Entries are indexed newest first: index 0 is the most recently pushed
/// entry. Pushing beyond [`HistoryStore::capacity`] drops the oldest
/// entries.
pub trait HistoryStore {
    /// Prepends an entry and drops entries beyond capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    fn push(&mut self, entry: HistoryEntry) -> Result<()>;

    /// Returns all entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the entries cannot be read.
    fn list(&self) -> Result<Vec<HistoryEntry>>;

    /// Returns the entry at `index` (0 is newest).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::EntryNotFound`] if `index` is out of range.
    fn get(&self, index: usize) -> Result<HistoryEntry> {
        self.list()?
            .into_iter()
            .nth(index)
            .ok_or_else(|| StorageError::EntryNotFound { index }.into())
    }

    /// Removes every entry, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn clear(&mut self) -> Result<usize>;

    /// Number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the count cannot be read.
    fn len(&self) -> Result<usize>;

    /// Whether the store holds no entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the count cannot be read.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Maximum number of entries kept.
    fn capacity(&self) -> usize;
}

impl<H: HistoryStore + ?Sized> HistoryStore for &mut H {
    fn push(&mut self, entry: HistoryEntry) -> Result<()> {
        (**self).push(entry)
    }

    fn list(&self) -> Result<Vec<HistoryEntry>> {
        (**self).list()
    }

    fn get(&self, index: usize) -> Result<HistoryEntry> {
        (**self).get(index)
    }

    fn clear(&mut self) -> Result<usize> {
        (**self).clear()
    }

    fn len(&self) -> Result<usize> {
        (**self).len()
    }

    fn capacity(&self) -> usize {
        (**self).capacity()
    }
}
