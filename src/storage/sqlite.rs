//! `SQLite` history store.
//!
//! Persists the bounded history list across invocations of the CLI. Each
//! entry is stored as a JSON payload; the row id gives insertion order.

// SQLite stores all integers as i64. These casts are intentional and safe
// because we only store non-negative values that fit in usize.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use crate::core::HistoryEntry;
use crate::error::{Error, Result, StorageError};
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, GET_VERSION_SQL, SCHEMA_SQL, SET_VERSION_SQL,
};
use crate::storage::traits::{DEFAULT_HISTORY_CAPACITY, HistoryStore};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use tracing::debug;

/// SQLite-backed history list.
///
/// # Examples
///
/// ```no_run
/// use fleetmux::storage::{HistoryStore, SqliteHistory};
///
/// let mut history = SqliteHistory::open(".fleetmux/history.db", 10).unwrap();
/// history.init().unwrap();
/// println!("{} runs recorded", history.len().unwrap());
/// ```
pub struct SqliteHistory {
    /// `SQLite` connection.
    conn: Connection,
    /// Path to the database file (None for in-memory).
    path: Option<PathBuf>,
    /// Maximum number of entries kept.
    capacity: usize,
}

impl SqliteHistory {
    /// Opens or creates a history database at the given path.
    ///
    /// The parent directory is created if missing. Call
    /// [`SqliteHistory::init`] before use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero capacity, or an error if the
    /// database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize) -> Result<Self> {
        check_capacity(capacity)?;
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Database(e.to_string()))?;
        }

        let conn = Connection::open(&path).map_err(StorageError::from)?;

        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(StorageError::from)?;

        Ok(Self {
            conn,
            path: Some(path),
            capacity,
        })
    }

    /// Creates an in-memory history database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero capacity, or an error if the
    /// database cannot be created.
    pub fn in_memory(capacity: usize) -> Result<Self> {
        check_capacity(capacity)?;
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        Ok(Self {
            conn,
            path: None,
            capacity,
        })
    }

    /// Creates an in-memory database with the default capacity, initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory_default() -> Result<Self> {
        let mut history = Self::in_memory(DEFAULT_HISTORY_CAPACITY)?;
        history.init()?;
        Ok(history)
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Creates the schema if it does not exist yet.
    ///
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails or the database was
    /// written with a different schema version.
    pub fn init(&mut self) -> Result<()> {
        if !self.is_initialized()? {
            self.conn
                .execute_batch(SCHEMA_SQL)
                .map_err(StorageError::from)?;
            self.set_schema_version(CURRENT_SCHEMA_VERSION)?;
            debug!(path = ?self.path, "history schema created");
            return Ok(());
        }
        match self.get_schema_version()? {
            Some(CURRENT_SCHEMA_VERSION) => Ok(()),
            found => Err(StorageError::Database(format!(
                "unsupported history schema version {found:?}, expected {CURRENT_SCHEMA_VERSION}"
            ))
            .into()),
        }
    }

    /// Checks if the schema exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    pub fn is_initialized(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count > 0)
    }

    fn get_schema_version(&self) -> Result<Option<u32>> {
        let version: Option<String> = self
            .conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()
            .map_err(StorageError::from)?;

        Ok(version.and_then(|v| v.parse().ok()))
    }

    fn set_schema_version(&self, version: u32) -> Result<()> {
        self.conn
            .execute(SET_VERSION_SQL, params![version.to_string()])
            .map_err(StorageError::from)?;
        Ok(())
    }

    /// Deletes every row beyond the newest `capacity`.
    fn trim(&self) -> Result<usize> {
        let removed = self
            .conn
            .execute(
                r"
            DELETE FROM history WHERE id NOT IN (
                SELECT id FROM history ORDER BY id DESC LIMIT ?
            )
        ",
                params![self.capacity as i64],
            )
            .map_err(StorageError::from)?;
        Ok(removed)
    }
}

fn check_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(Error::config("history capacity must be greater than zero"));
    }
    Ok(())
}

fn decode_entry(data: &str) -> Result<HistoryEntry> {
    Ok(serde_json::from_str(data).map_err(StorageError::from)?)
}

impl HistoryStore for SqliteHistory {
    fn push(&mut self, entry: HistoryEntry) -> Result<()> {
        let data = serde_json::to_string(&entry).map_err(StorageError::from)?;
        self.conn
            .execute(
                "INSERT INTO history (topic, data, created_at) VALUES (?, ?, ?)",
                params![entry.topic, data, entry.created_at],
            )
            .map_err(StorageError::from)?;

        let removed = self.trim()?;
        if removed > 0 {
            debug!(removed, capacity = self.capacity, "trimmed history");
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM history ORDER BY id DESC LIMIT ?")
            .map_err(StorageError::from)?;

        let rows = stmt
            .query_map(params![self.capacity as i64], |row| row.get::<_, String>(0))
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        rows.iter().map(|data| decode_entry(data)).collect()
    }

    fn get(&self, index: usize) -> Result<HistoryEntry> {
        if index >= self.capacity {
            return Err(StorageError::EntryNotFound { index }.into());
        }
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM history ORDER BY id DESC LIMIT 1 OFFSET ?",
                params![index as i64],
                |row| row.get(0),
            )
            .optional()
            .map_err(StorageError::from)?;

        match data {
            Some(data) => decode_entry(&data),
            None => Err(StorageError::EntryNotFound { index }.into()),
        }
    }

    fn clear(&mut self) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM history", [])
            .map_err(StorageError::from)?;
        Ok(removed)
    }

    fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok((count as usize).min(self.capacity))
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
