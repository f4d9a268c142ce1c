//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::{HistoryEntry, Section};
use crate::demux::{Dashboard, PLACEHOLDER, SectionMap};
use crate::error::Error;
use crate::session::RunOutcome;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use unicode_segmentation::UnicodeSegmentation;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats the dashboard left behind by a run.
#[must_use]
pub fn format_run(dashboard: &Dashboard, outcome: &RunOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_run_text(dashboard),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct RunOutput<'a> {
                dashboard: &'a Dashboard,
                #[serde(flatten)]
                outcome: &'a RunOutcome,
            }
            format_json(&RunOutput { dashboard, outcome })
        }
    }
}

fn format_run_text(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Status: {}", dashboard.run_status());
    let _ = writeln!(
        output,
        "Agent:  {}",
        dashboard.agent().unwrap_or("Idle")
    );

    output.push_str("\nTelemetry\n");
    output.push_str(&"-".repeat(40));
    output.push('\n');
    for line in dashboard.log() {
        let _ = writeln!(output, "> {line}");
    }

    for section in Section::ALL {
        push_heading(&mut output, section.headings().canonical);
        let body = dashboard.section(section).markdown().unwrap_or(PLACEHOLDER);
        let _ = writeln!(output, "{body}");
    }

    push_heading(&mut output, "Memory");
    let _ = writeln!(output, "{}", dashboard.memory().unwrap_or(PLACEHOLDER));
    output
}

/// Formats a report split into sections.
///
/// Sections with nothing to display are omitted.
#[must_use]
pub fn format_sections(map: &SectionMap, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_sections_text(map),
        OutputFormat::Json => format_json(&SectionsOutput::new(map)),
    }
}

#[derive(Serialize)]
struct SectionsOutput {
    sections: BTreeMap<&'static str, String>,
    summary_is_fallback: bool,
}

impl SectionsOutput {
    fn new(map: &SectionMap) -> Self {
        Self {
            sections: map
                .renderable()
                .map(|(section, markdown)| (section.slug(), markdown))
                .collect(),
            summary_is_fallback: map.summary_is_fallback(),
        }
    }
}

fn format_sections_text(map: &SectionMap) -> String {
    let mut output = String::new();
    for (section, markdown) in map.renderable() {
        push_heading(&mut output, section.headings().canonical);
        let _ = writeln!(output, "{markdown}");
    }
    if output.is_empty() {
        output.push_str("No report sections found.\n");
    }
    output
}

/// Formats the history list.
#[must_use]
pub fn format_history_list(entries: &[HistoryEntry], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_history_list_text(entries),
        OutputFormat::Json => format_json(&entries),
    }
}

fn format_history_list_text(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No previous sessions.\n".to_string();
    }

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<4} {:<20} {:<14} {:<10} Topic",
        "#", "Completed", "Difficulty", "Time"
    );
    output.push_str(&"-".repeat(70));
    output.push('\n');

    for (index, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            output,
            "{:<4} {:<20} {:<14} {:<10} {}",
            index,
            format!("{} {}", entry.date, entry.time),
            truncate(&entry.difficulty, 14),
            truncate(&entry.study_time, 10),
            truncate(&entry.topic, 40)
        );
    }

    output
}

/// Formats one history entry with its report split into sections.
#[must_use]
pub fn format_history_entry(index: usize, entry: &HistoryEntry, format: OutputFormat) -> String {
    let map = crate::demux::split_sections(&entry.report);
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Session {index}: {}", entry.topic);
            let _ = writeln!(output, "  Completed:   {} {}", entry.date, entry.time);
            let _ = writeln!(output, "  Difficulty:  {}", entry.difficulty);
            let _ = writeln!(output, "  Study time:  {}", entry.study_time);
            output.push_str(&format_sections_text(&map));
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct EntryOutput<'a> {
                index: usize,
                entry: &'a HistoryEntry,
                #[serde(flatten)]
                sections: SectionsOutput,
            }
            format_json(&EntryOutput {
                index,
                entry,
                sections: SectionsOutput::new(&map),
            })
        }
    }
}

/// Formats the result of clearing history.
#[must_use]
pub fn format_cleared(removed: usize, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("Cleared {removed} history entries.\n"),
        OutputFormat::Json => format_json(&serde_json::json!({ "cleared": removed })),
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => format_json(&serde_json::json!({
            "success": false,
            "error": error.to_string(),
        })),
    }
}

fn push_heading(output: &mut String, title: &str) {
    let _ = writeln!(output, "\n== {title} ==");
}

fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

/// Shortens text to `max_len` grapheme clusters, ending with `...` when cut.
fn truncate(s: &str, max_len: usize) -> String {
    let graphemes: Vec<&str> = s.graphemes(true).collect();
    if graphemes.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        graphemes[..max_len].concat()
    } else {
        format!("{}...", graphemes[..max_len - 3].concat())
    }
}
