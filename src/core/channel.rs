//! Logical channels and the in-band markers that switch between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An in-band control token embedded literally in the text stream.
///
/// Markers are neither escaped nor quoted: any literal occurrence of the
/// token text is treated as a control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamMarker {
    /// `[FINAL_REPORT]`: switches to the final report channel.
    FinalReport,
    /// `[MEMORY_SUMMARY]`: switches to the memory summary channel.
    MemorySummary,
}

impl StreamMarker {
    /// Markers in detection priority order.
    ///
    /// The final report marker is checked first even when a memory summary
    /// marker appears earlier in the same text.
    pub const PRIORITY: [Self; 2] = [Self::FinalReport, Self::MemorySummary];

    /// Returns the literal token text.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::FinalReport => "[FINAL_REPORT]",
            Self::MemorySummary => "[MEMORY_SUMMARY]",
        }
    }

    /// Returns the channel this marker activates.
    #[must_use]
    pub const fn channel(self) -> Channel {
        match self {
            Self::FinalReport => Channel::FinalReport,
            Self::MemorySummary => Channel::MemorySummary,
        }
    }
}

impl fmt::Display for StreamMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The logical channel currently receiving stream content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Live progress log lines (initial channel).
    #[default]
    Telemetry,
    /// The structured final report.
    FinalReport,
    /// The memory/state summary.
    MemorySummary,
}

impl Channel {
    /// Stable name for logs and JSON output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Telemetry => "telemetry",
            Self::FinalReport => "final_report",
            Self::MemorySummary => "memory_summary",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
