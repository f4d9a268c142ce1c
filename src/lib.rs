//! # fleetmux
//!
//! Streaming channel demultiplexer for agent-fleet output.
//!
//! An agent fleet reports progress as free-form log lines and then emits a
//! structured study report and a memory summary on the same stream, each
//! introduced by a marker token. fleetmux consumes that stream chunk by
//! chunk, at arbitrary boundaries, and routes every piece of text to the
//! right place as it arrives.
//!
//! ## Features
//!
//! - **Demultiplexing**: `[FINAL_REPORT]` and `[MEMORY_SUMMARY]` markers, even when split across chunks
//! - **Section Splitting**: the report is re-partitioned into study sections on every update
//! - **Incremental Decoding**: multi-byte UTF-8 characters survive arbitrary read boundaries
//! - **History**: bounded list of completed runs, in memory or in `SQLite`
//!
//! ## Example
//!
//! ```
//! use fleetmux::core::Section;
//! use fleetmux::demux::{Dashboard, RunState};
//!
//! let mut dashboard = Dashboard::new();
//! let mut state = RunState::new();
//! for chunk in ["Agent: Planner\n[FINAL_", "REPORT]# Study Roadmap\n", "Week 1"] {
//!     state.feed(chunk, &mut dashboard);
//! }
//! let summary = state.finish(&mut dashboard);
//!
//! assert_eq!(dashboard.agent(), Some("Planner"));
//! assert_eq!(summary.sections.lines(Section::Schedule), ["# Study Roadmap", "Week 1"]);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod demux;
pub mod error;
pub mod io;
pub mod session;
pub mod storage;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use crate::core::{Channel, HistoryEntry, Section, StreamMarker};

// Re-export demultiplexer types
pub use demux::{Dashboard, DemuxOptions, RunSink, RunState, RunStatus, RunSummary, SectionMap};

// Re-export session types
pub use session::{ActiveRun, RunConfig, RunOutcome, RunRequest, Session};

// Re-export storage types
pub use storage::{DEFAULT_DB_PATH, HistoryStore, MemoryHistory, SqliteHistory};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
