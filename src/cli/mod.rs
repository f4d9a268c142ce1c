//! CLI layer for fleetmux.
//!
//! Provides the command-line interface using clap, with commands for
//! running a stream through the demultiplexer, splitting finished reports
//! and managing the run history.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, HistoryCommands};
