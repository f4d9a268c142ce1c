//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::cli::output::{
    OutputFormat, format_cleared, format_history_entry, format_history_list, format_run,
    format_sections,
};
use crate::cli::parser::{Cli, Commands, HistoryCommands};
use crate::demux::{Dashboard, split_sections};
use crate::error::{CommandError, Result};
use crate::io::{open_input, read_text};
use crate::session::{RunConfig, RunOutcome, RunRequest, Session};
use crate::storage::{HistoryStore, SqliteHistory};
use std::path::Path;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute, including a run that
/// ended in failure.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Run {
            input,
            topic,
            notes,
            difficulty,
            study_time,
            chunk_size,
            strip_ansi,
        } => {
            let config = RunConfig {
                chunk_size: *chunk_size,
                strip_ansi: *strip_ansi,
            };
            let request = RunRequest::new(topic.as_str())
                .with_notes(notes.as_str())
                .with_difficulty(difficulty.as_str())
                .with_study_time(study_time.as_str());
            cmd_run(&db_path, cli.history_capacity, input, request, config, format)
        }
        Commands::Split { file } => cmd_split(file, format),
        Commands::History(history_cmd) => match history_cmd {
            HistoryCommands::List => cmd_history_list(&db_path, cli.history_capacity, format),
            HistoryCommands::Show { index } => {
                cmd_history_show(&db_path, cli.history_capacity, *index, format)
            }
            HistoryCommands::Clear { yes } => {
                cmd_history_clear(&db_path, cli.history_capacity, *yes, format)
            }
        },
    }
}

/// Opens the history database, creating and initializing it if needed.
fn open_history(db_path: &Path, capacity: usize) -> Result<SqliteHistory> {
    let mut history = SqliteHistory::open(db_path, capacity)?;
    history.init()?;
    Ok(history)
}

// ==================== Command Implementations ====================

fn cmd_run(
    db_path: &Path,
    capacity: usize,
    input: &Path,
    request: RunRequest,
    config: RunConfig,
    format: OutputFormat,
) -> Result<String> {
    config.validate()?;
    let history = open_history(db_path, capacity)?;
    let mut session = Session::with_config(history, config)?;
    let reader = open_input(input)?;

    let mut dashboard = Dashboard::new();
    let outcome = session.run(request, reader, &mut dashboard)?;
    match &outcome {
        RunOutcome::Completed(_) => Ok(format_run(&dashboard, &outcome, format)),
        RunOutcome::Failed { error } => Err(CommandError::ExecutionFailed(error.clone()).into()),
    }
}

fn cmd_split(file: &Path, format: OutputFormat) -> Result<String> {
    let report = read_text(file)?;
    Ok(format_sections(&split_sections(&report), format))
}

fn cmd_history_list(db_path: &Path, capacity: usize, format: OutputFormat) -> Result<String> {
    let history = open_history(db_path, capacity)?;
    let entries = history.list()?;
    Ok(format_history_list(&entries, format))
}

fn cmd_history_show(
    db_path: &Path,
    capacity: usize,
    index: usize,
    format: OutputFormat,
) -> Result<String> {
    let history = open_history(db_path, capacity)?;
    let entry = history.get(index)?;
    Ok(format_history_entry(index, &entry, format))
}

fn cmd_history_clear(
    db_path: &Path,
    capacity: usize,
    yes: bool,
    format: OutputFormat,
) -> Result<String> {
    if !yes {
        return Err(CommandError::ExecutionFailed(
            "Use --yes to confirm. This will delete all recorded runs.".to_string(),
        )
        .into());
    }

    let mut history = open_history(db_path, capacity)?;
    let removed = history.clear()?;
    Ok(format_cleared(removed, format))
}
