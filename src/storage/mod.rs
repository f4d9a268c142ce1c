//! Storage layer for fleetmux.
//!
//! Keeps the bounded history of completed runs. Two backends implement
//! [`HistoryStore`]: an in-memory list and a `SQLite` database used by the
//! CLI so history survives between invocations.

pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryHistory;
pub use schema::{CURRENT_SCHEMA_VERSION, SCHEMA_SQL};
pub use sqlite::SqliteHistory;
pub use traits::{DEFAULT_HISTORY_CAPACITY, HistoryStore};

/// Default database path relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".fleetmux/history.db";
