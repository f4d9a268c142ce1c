//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::io::{DEFAULT_CHUNK_SIZE, STDIN_PATH};
use crate::session::{DEFAULT_DIFFICULTY, DEFAULT_STUDY_TIME};
use crate::storage::DEFAULT_HISTORY_CAPACITY;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fleetmux: demultiplex agent-fleet output into telemetry, report and memory.
///
/// Reads a marker-delimited stream, shows the telemetry log, splits the
/// final report into study sections and keeps a short history of runs.
#[derive(Parser, Debug)]
#[command(name = "fleetmux")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the history database file.
    ///
    /// Defaults to `.fleetmux/history.db` in the current directory.
    #[arg(short, long, env = "FLEETMUX_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Number of history entries kept.
    #[arg(
        long,
        env = "FLEETMUX_HISTORY_CAPACITY",
        default_value_t = DEFAULT_HISTORY_CAPACITY,
        global = true
    )]
    pub history_capacity: usize,

    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Demultiplex a fleet output stream and record the run.
    ///
    /// Reads the stream in chunks from a file or standard input, prints the
    /// resulting dashboard and appends the run to history.
    Run {
        /// Stream source (`-` for stdin).
        #[arg(default_value = STDIN_PATH)]
        input: PathBuf,

        /// Study topic.
        #[arg(short, long)]
        topic: String,

        /// Notes sent along with the topic.
        #[arg(short, long, default_value = "")]
        notes: String,

        /// Difficulty label.
        #[arg(long, default_value = DEFAULT_DIFFICULTY)]
        difficulty: String,

        /// Study time label.
        #[arg(long, default_value = DEFAULT_STUDY_TIME)]
        study_time: String,

        /// Bytes per read.
        #[arg(long, env = "FLEETMUX_CHUNK_SIZE", default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Strip ANSI escape sequences from telemetry lines.
        #[arg(long)]
        strip_ansi: bool,
    },

    /// Split a finished report into sections without recording it.
    Split {
        /// Report file (`-` for stdin).
        #[arg(default_value = STDIN_PATH)]
        file: PathBuf,
    },

    /// History commands.
    #[command(subcommand)]
    History(HistoryCommands),
}

/// History subcommands.
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List recorded runs, newest first.
    List,

    /// Show a recorded run's report split into sections.
    Show {
        /// Entry index (0 is the newest).
        index: usize,
    },

    /// Delete every recorded run.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

impl Cli {
    /// Returns the database path, using default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }
}
