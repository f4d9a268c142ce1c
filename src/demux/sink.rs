//! Output sinks for a streaming run.
//!
//! The demultiplexer never draws anything itself. It drives a [`RunSink`],
//! which owns the log view, the status and agent displays, one region per
//! report section and the memory region. [`Dashboard`] is an in-memory
//! implementation used by the CLI and by tests.

use crate::core::Section;
use serde::Serialize;
use std::fmt;

/// Text shown in an output region before any content arrives.
pub const PLACEHOLDER: &str = "Processing...";

/// Run status shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No run has started.
    #[default]
    Idle,
    /// Chunks are being consumed.
    Active,
    /// The stream ended and the run was recorded.
    Complete,
    /// The run was abandoned.
    Failed,
}

impl RunStatus {
    /// Whether the status ends a run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Active => "Agent Fleet Active",
            Self::Complete => "Mission Complete",
            Self::Failed => "System Error",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receiver for everything a run displays.
///
/// Calls arrive strictly in stream order from a single consumer.
pub trait RunSink {
    /// Appends one telemetry line to the log view.
    fn log_line(&mut self, line: &str);

    /// Updates the currently active agent display.
    fn active_agent(&mut self, name: &str);

    /// Replaces a section region with the given markdown.
    fn render_section(&mut self, section: Section, markdown: &str);

    /// Post-processes rendered regions (link decoration, table styling).
    ///
    /// Invoked after every section render pass.
    fn enhance(&mut self) {}

    /// Replaces the memory region with preformatted text.
    ///
    /// Never called with whitespace-only text.
    fn render_memory(&mut self, text: &str);

    /// Updates the run status.
    fn status(&mut self, status: RunStatus);

    /// Puts every output region back to its placeholder.
    fn reset(&mut self) {}
}

impl<S: RunSink + ?Sized> RunSink for &mut S {
    fn log_line(&mut self, line: &str) {
        (**self).log_line(line);
    }

    fn active_agent(&mut self, name: &str) {
        (**self).active_agent(name);
    }

    fn render_section(&mut self, section: Section, markdown: &str) {
        (**self).render_section(section, markdown);
    }

    fn enhance(&mut self) {
        (**self).enhance();
    }

    fn render_memory(&mut self, text: &str) {
        (**self).render_memory(text);
    }

    fn status(&mut self, status: RunStatus) {
        (**self).status(status);
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// Content of one output region.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "markdown", rename_all = "snake_case")]
pub enum Region {
    /// Nothing rendered yet.
    #[default]
    Placeholder,
    /// Last rendered markdown.
    Rendered(String),
}

impl Region {
    /// Rendered markdown, if any.
    #[must_use]
    pub fn markdown(&self) -> Option<&str> {
        match self {
            Self::Placeholder => None,
            Self::Rendered(md) => Some(md),
        }
    }

    /// Whether the region still shows its placeholder.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

/// In-memory display model.
///
/// # Examples
///
/// ```
/// use fleetmux::demux::sink::{Dashboard, RunSink};
///
/// let mut dashboard = Dashboard::new();
/// dashboard.log_line("Task started");
/// assert_eq!(dashboard.log(), ["Task started"]);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    log: Vec<String>,
    agent: Option<String>,
    status: RunStatus,
    sections: [Region; 5],
    memory: Option<String>,
    render_passes: usize,
}

impl Dashboard {
    /// Creates an empty dashboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Telemetry lines in arrival order.
    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Current active agent display.
    #[must_use]
    pub fn agent(&self) -> Option<&str> {
        self.agent.as_deref()
    }

    /// Current run status.
    #[must_use]
    pub const fn run_status(&self) -> RunStatus {
        self.status
    }

    /// Region for a section.
    #[must_use]
    pub fn section(&self, section: Section) -> &Region {
        &self.sections[section.index()]
    }

    /// Current memory region content.
    #[must_use]
    pub fn memory(&self) -> Option<&str> {
        self.memory.as_deref()
    }

    /// Number of completed render passes (one per `enhance`).
    #[must_use]
    pub const fn render_passes(&self) -> usize {
        self.render_passes
    }
}

impl RunSink for Dashboard {
    fn log_line(&mut self, line: &str) {
        self.log.push(line.to_string());
    }

    fn active_agent(&mut self, name: &str) {
        self.agent = Some(name.to_string());
    }

    fn render_section(&mut self, section: Section, markdown: &str) {
        self.sections[section.index()] = Region::Rendered(markdown.to_string());
    }

    fn enhance(&mut self) {
        self.render_passes += 1;
    }

    fn render_memory(&mut self, text: &str) {
        self.memory = Some(text.to_string());
    }

    fn status(&mut self, status: RunStatus) {
        self.status = status;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_regions() {
        let mut dashboard = Dashboard::new();
        assert!(dashboard.section(Section::Quiz).is_placeholder());

        dashboard.render_section(Section::Quiz, "# Practice Questions");
        assert_eq!(
            dashboard.section(Section::Quiz).markdown(),
            Some("# Practice Questions")
        );

        dashboard.render_section(Section::Quiz, "# Practice Questions\nQ1");
        assert_eq!(
            dashboard.section(Section::Quiz).markdown(),
            Some("# Practice Questions\nQ1")
        );
    }

    #[test]
    fn test_dashboard_reset() {
        let mut dashboard = Dashboard::new();
        dashboard.log_line("line");
        dashboard.active_agent("Planner");
        dashboard.render_memory("state");
        dashboard.status(RunStatus::Active);
        dashboard.reset();

        assert!(dashboard.log().is_empty());
        assert_eq!(dashboard.agent(), None);
        assert_eq!(dashboard.memory(), None);
        assert_eq!(dashboard.run_status(), RunStatus::Idle);
    }

    #[test]
    fn test_sink_through_mut_reference() {
        fn drive(mut sink: impl RunSink) {
            sink.log_line("via reference");
            sink.enhance();
        }

        let mut dashboard = Dashboard::new();
        drive(&mut dashboard);
        assert_eq!(dashboard.log(), ["via reference"]);
        assert_eq!(dashboard.render_passes(), 1);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(RunStatus::Complete.to_string(), "Mission Complete");
        assert!(RunStatus::Failed.is_terminal());
        assert!(!RunStatus::Active.is_terminal());
    }
}
