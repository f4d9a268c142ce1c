//! History records for completed runs.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A completed run, as persisted in the history list.
///
/// Field names serialize in camelCase to match the stored record format
/// (`studyTime`, `createdAt`).
///
/// # Examples
///
/// ```
/// use fleetmux::core::HistoryEntry;
///
/// let entry = HistoryEntry::new("Rust ownership", "# Study Roadmap", "Advanced", "2 hours");
/// assert_eq!(entry.topic, "Rust ownership");
/// assert!(!entry.date.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Study topic the run was started with.
    pub topic: String,

    /// Full final report text.
    pub report: String,

    /// Difficulty label.
    pub difficulty: String,

    /// Study time label.
    pub study_time: String,

    /// Local date the run completed.
    pub date: String,

    /// Local time the run completed.
    pub time: String,

    /// Unix timestamp the run completed.
    #[serde(default)]
    pub created_at: i64,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current local date and time.
    #[must_use]
    pub fn new(
        topic: impl Into<String>,
        report: impl Into<String>,
        difficulty: impl Into<String>,
        study_time: impl Into<String>,
    ) -> Self {
        Self::at(topic, report, difficulty, study_time, Local::now())
    }

    /// Creates an entry stamped with the given instant.
    #[must_use]
    pub fn at(
        topic: impl Into<String>,
        report: impl Into<String>,
        difficulty: impl Into<String>,
        study_time: impl Into<String>,
        when: DateTime<Local>,
    ) -> Self {
        Self {
            topic: topic.into(),
            report: report.into(),
            difficulty: difficulty.into(),
            study_time: study_time.into(),
            date: when.format("%Y-%m-%d").to_string(),
            time: when.format("%H:%M:%S").to_string(),
            created_at: when.timestamp(),
        }
    }
}
