//! Channel state machine.
//!
//! [`RunState`] owns everything a single run accumulates: the active
//! channel, the final report and memory buffers, the incomplete trailing
//! telemetry line and any held-back partial marker. A fresh value is built
//! for every run; nothing here is shared between runs.

use crate::core::{Channel, StreamMarker};
use crate::demux::scanner::{Scan, partial_marker_len, scan};
use crate::demux::sink::RunSink;
use crate::demux::splitter::{SectionMap, split_sections};
use crate::demux::telemetry::{extract_agent, strip_ansi};
use serde::Serialize;
use tracing::{debug, trace};

/// Behaviour switches for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemuxOptions {
    /// Strip ANSI escape sequences from telemetry lines.
    pub strip_ansi: bool,
}

/// Final state of a run's channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Channel active when the stream ended.
    pub channel: Channel,
    /// Full final report text.
    pub report: String,
    /// Full memory summary text.
    pub memory: String,
    /// Sections of the final report.
    pub sections: SectionMap,
    /// Number of telemetry lines emitted.
    pub telemetry_lines: usize,
}

/// Per-run demultiplexer state.
///
/// # Examples
///
/// ```
/// use fleetmux::core::{Channel, Section};
/// use fleetmux::demux::machine::RunState;
/// use fleetmux::demux::sink::Dashboard;
///
/// let mut sink = Dashboard::new();
/// let mut state = RunState::new();
/// state.feed("log line 1\n[FINAL_REPORT]# High-Yield Content Analysis\nPoint A", &mut sink);
///
/// assert_eq!(state.channel(), Channel::FinalReport);
/// assert_eq!(state.report(), "# High-Yield Content Analysis\nPoint A");
/// assert_eq!(sink.log(), ["log line 1"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunState {
    options: DemuxOptions,
    channel: Channel,
    report: String,
    memory: String,
    /// Telemetry text after the last newline.
    line_tail: String,
    /// Suffix that may be the start of a marker split across chunks.
    held: String,
    telemetry_lines: usize,
}

impl RunState {
    /// Creates a state on the telemetry channel with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state with the given options.
    #[must_use]
    pub fn with_options(options: DemuxOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Currently active channel.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.channel
    }

    /// Final report text accumulated so far.
    #[must_use]
    pub fn report(&self) -> &str {
        &self.report
    }

    /// Memory summary text accumulated so far.
    #[must_use]
    pub fn memory(&self) -> &str {
        &self.memory
    }

    /// Consumes one decoded chunk.
    ///
    /// A trailing fragment that could begin a marker is held back and
    /// prepended to the next chunk.
    pub fn feed<S: RunSink + ?Sized>(&mut self, chunk: &str, sink: &mut S) {
        trace!(len = chunk.len(), channel = %self.channel, "chunk");

        let mut text = std::mem::take(&mut self.held);
        text.push_str(chunk);

        let keep = partial_marker_len(&text, &StreamMarker::PRIORITY);
        let ready_len = text.len() - keep;
        self.route(&text[..ready_len], sink);
        self.held = text.split_off(ready_len);
    }

    /// Ends the run, flushing held-back text and the telemetry tail.
    pub fn finish<S: RunSink + ?Sized>(mut self, sink: &mut S) -> RunSummary {
        let held = std::mem::take(&mut self.held);
        if !held.is_empty() {
            self.deliver(&held, sink);
        }
        self.flush_line_tail(sink);

        let sections = split_sections(&self.report);
        debug!(
            channel = %self.channel,
            report_len = self.report.len(),
            memory_len = self.memory.len(),
            "run finished"
        );
        RunSummary {
            channel: self.channel,
            report: self.report,
            memory: self.memory,
            sections,
            telemetry_lines: self.telemetry_lines,
        }
    }

    /// Ends a failed run.
    ///
    /// Held-back marker text is dropped and the regions keep their last
    /// render. An incomplete telemetry line already received is still logged.
    pub fn abandon<S: RunSink + ?Sized>(mut self, sink: &mut S) {
        if !self.held.is_empty() {
            trace!(len = self.held.len(), "dropping held-back text");
        }
        if self.channel == Channel::Telemetry {
            self.flush_line_tail(sink);
        }
        debug!(channel = %self.channel, "run abandoned");
    }

    /// Routes one chunk's worth of text.
    ///
    /// At most one marker takes effect per chunk. Text before it goes to the
    /// channel active at that point; everything after it, later marker
    /// tokens included, goes to the new channel unscanned.
    fn route<S: RunSink + ?Sized>(&mut self, text: &str, sink: &mut S) {
        match scan(text, &StreamMarker::PRIORITY) {
            Scan::Passthrough(text) => {
                if !text.is_empty() {
                    self.deliver(text, sink);
                }
            }
            Scan::Marker {
                marker,
                before,
                after,
            } => {
                if !before.is_empty() {
                    self.deliver(before, sink);
                }
                self.transition(marker, sink);
                // A transition renders even when nothing follows it.
                self.deliver(after, sink);
            }
        }
    }

    /// Switches to the marker's channel with an emptied buffer.
    fn transition<S: RunSink + ?Sized>(&mut self, marker: StreamMarker, sink: &mut S) {
        if self.channel == Channel::Telemetry {
            self.flush_line_tail(sink);
        }
        debug!(from = %self.channel, to = %marker.channel(), "channel transition");
        self.channel = marker.channel();
        match self.channel {
            Channel::FinalReport => self.report.clear(),
            Channel::MemorySummary => self.memory.clear(),
            Channel::Telemetry => {}
        }
    }

    /// Hands marker-free text to the active channel's handler.
    fn deliver<S: RunSink + ?Sized>(&mut self, text: &str, sink: &mut S) {
        match self.channel {
            Channel::Telemetry => self.push_telemetry(text, sink),
            Channel::FinalReport => {
                self.report.push_str(text);
                render_report(&self.report, sink);
            }
            Channel::MemorySummary => {
                self.memory.push_str(text);
                if !self.memory.trim().is_empty() {
                    sink.render_memory(&self.memory);
                }
            }
        }
    }

    fn push_telemetry<S: RunSink + ?Sized>(&mut self, text: &str, sink: &mut S) {
        self.line_tail.push_str(text);
        while let Some(pos) = self.line_tail.find('\n') {
            let line: String = self.line_tail.drain(..=pos).collect();
            self.emit_line(&line[..pos], sink);
        }
    }

    fn flush_line_tail<S: RunSink + ?Sized>(&mut self, sink: &mut S) {
        let tail = std::mem::take(&mut self.line_tail);
        self.emit_line(&tail, sink);
    }

    fn emit_line<S: RunSink + ?Sized>(&mut self, raw: &str, sink: &mut S) {
        let line = if self.options.strip_ansi {
            strip_ansi(raw)
        } else {
            raw.into()
        };
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        sink.log_line(line);
        self.telemetry_lines += 1;
        if let Some(agent) = extract_agent(line) {
            sink.active_agent(agent);
        }
    }
}

/// Splits the report and renders every section with content.
fn render_report<S: RunSink + ?Sized>(report: &str, sink: &mut S) {
    let sections = split_sections(report);
    for (section, markdown) in sections.renderable() {
        sink.render_section(section, &markdown);
    }
    sink.enhance();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Section;
    use crate::demux::sink::Dashboard;

    fn run(chunks: &[&str]) -> (RunSummary, Dashboard) {
        let mut sink = Dashboard::new();
        let mut state = RunState::new();
        for chunk in chunks {
            state.feed(chunk, &mut sink);
        }
        let summary = state.finish(&mut sink);
        (summary, sink)
    }

    #[test]
    fn test_telemetry_only() {
        let (summary, sink) = run(&["first line\n\n  second line  \n", "third"]);
        assert_eq!(sink.log(), ["first line", "second line", "third"]);
        assert_eq!(summary.channel, Channel::Telemetry);
        assert_eq!(summary.telemetry_lines, 3);
        assert!(summary.report.is_empty());
    }

    #[test]
    fn test_line_split_across_chunks_is_emitted_once() {
        let (_, sink) = run(&["Task st", "arted\nDo", "ne\n"]);
        assert_eq!(sink.log(), ["Task started", "Done"]);
    }

    #[test]
    fn test_marker_in_single_chunk() {
        let (summary, sink) =
            run(&["log line 1\n[FINAL_REPORT]# High-Yield Content Analysis\nPoint A"]);
        assert_eq!(sink.log(), ["log line 1"]);
        assert_eq!(summary.report, "# High-Yield Content Analysis\nPoint A");
        assert_eq!(
            summary.sections.lines(Section::Summary),
            ["# High-Yield Content Analysis", "Point A"]
        );
        assert_eq!(
            sink.section(Section::Summary).markdown(),
            Some("# High-Yield Content Analysis\nPoint A")
        );
    }

    #[test]
    fn test_marker_split_across_chunks() {
        let (summary, sink) = run(&["booting\n[FINAL_", "REPORT]# Study Roadmap\nWeek 1"]);
        assert_eq!(sink.log(), ["booting"]);
        assert_eq!(summary.report, "# Study Roadmap\nWeek 1");
        assert_eq!(summary.channel, Channel::FinalReport);
    }

    #[test]
    fn test_false_partial_marker_is_released() {
        let (summary, sink) = run(&["progress [", "50%]\n", "tail ["]);
        assert_eq!(sink.log(), ["progress [50%]", "tail ["]);
        assert_eq!(summary.channel, Channel::Telemetry);
    }

    #[test]
    fn test_report_accumulates_and_rerenders() {
        let (summary, sink) = run(&[
            "[FINAL_REPORT]\n# Study Roadmap\n",
            "Week 1\n# Practice ",
            "Questions\nQ1",
        ]);
        assert_eq!(summary.report, "\n# Study Roadmap\nWeek 1\n# Practice Questions\nQ1");
        assert_eq!(
            sink.section(Section::Schedule).markdown(),
            Some("# Study Roadmap\nWeek 1")
        );
        assert_eq!(
            sink.section(Section::Quiz).markdown(),
            Some("# Practice Questions\nQ1")
        );
        assert!(sink.render_passes() >= 3);
    }

    #[test]
    fn test_second_marker_in_same_chunk_stays_in_report() {
        let (summary, sink) = run(&[
            "working\n[FINAL_REPORT]\n# Study Roadmap\nDay 1\n[MEMORY_SUMMARY]\nTopic: graphs",
        ]);
        assert_eq!(
            summary.report,
            "\n# Study Roadmap\nDay 1\n[MEMORY_SUMMARY]\nTopic: graphs"
        );
        assert!(summary.memory.is_empty());
        assert_eq!(summary.channel, Channel::FinalReport);
        assert_eq!(sink.memory(), None);
    }

    #[test]
    fn test_repeated_marker_in_same_chunk_is_content() {
        let (summary, sink) = run(&["x[FINAL_REPORT]y[FINAL_REPORT]z"]);
        assert_eq!(sink.log(), ["x"]);
        assert_eq!(summary.report, "y[FINAL_REPORT]z");
    }

    #[test]
    fn test_memory_marker_in_next_chunk_switches() {
        let (summary, sink) = run(&[
            "[FINAL_REPORT]\n# Study Roadmap\nDay 1\n",
            "[MEMORY_SUMMARY]\nTopic: graphs",
        ]);
        assert_eq!(summary.report, "\n# Study Roadmap\nDay 1\n");
        assert_eq!(summary.channel, Channel::MemorySummary);
        assert_eq!(sink.memory(), Some("\nTopic: graphs"));
    }

    #[test]
    fn test_abandon_keeps_last_render() {
        let mut sink = Dashboard::new();
        let mut state = RunState::new();
        state.feed("[FINAL_REPORT]# Study Roadmap\nDay 1 [", &mut sink);
        let passes = sink.render_passes();
        state.abandon(&mut sink);

        assert_eq!(
            sink.section(Section::Schedule).markdown(),
            Some("# Study Roadmap\nDay 1 ")
        );
        assert_eq!(sink.render_passes(), passes);
    }

    #[test]
    fn test_abandon_flushes_telemetry_tail() {
        let mut sink = Dashboard::new();
        let mut state = RunState::new();
        state.feed("Agent: Scout\nhalf a line [FINAL_", &mut sink);
        state.abandon(&mut sink);
        assert_eq!(sink.log(), ["Agent: Scout", "half a line"]);
    }

    #[test]
    fn test_text_before_memory_marker_goes_to_active_channel() {
        let (summary, sink) = run(&["[FINAL_REPORT]# Study Roadmap\n", "Day 2\n[MEMORY_SUMMARY]m"]);
        assert_eq!(summary.report, "# Study Roadmap\nDay 2\n");
        assert!(sink.log().is_empty());
        assert_eq!(summary.memory, "m");
    }

    #[test]
    fn test_final_report_precedence_over_textual_position() {
        let (summary, sink) = run(&["a[MEMORY_SUMMARY]b[FINAL_REPORT]c"]);
        assert_eq!(sink.log(), ["a[MEMORY_SUMMARY]b"]);
        assert_eq!(summary.report, "c");
        assert!(summary.memory.is_empty());
        assert_eq!(summary.channel, Channel::FinalReport);
    }

    #[test]
    fn test_repeated_marker_resets_buffer() {
        let (summary, _) = run(&["[FINAL_REPORT]draft one", "\n[FINAL_REPORT]final"]);
        assert_eq!(summary.report, "final");
    }

    #[test]
    fn test_blank_memory_is_not_rendered() {
        let (summary, sink) = run(&["[MEMORY_SUMMARY]\n   \n"]);
        assert_eq!(summary.memory, "\n   \n");
        assert_eq!(sink.memory(), None);
    }

    #[test]
    fn test_agent_extraction_updates_display() {
        let (_, sink) = run(&["Agent: Researcher-7 started task\nno label\n"]);
        assert_eq!(sink.agent(), Some("Researcher-7 started task"));
        assert_eq!(sink.log().len(), 2);
    }

    #[test]
    fn test_strip_ansi_option() {
        let mut sink = Dashboard::new();
        let mut state = RunState::with_options(DemuxOptions { strip_ansi: true });
        state.feed("\x1B[1m\x1B[95m# Agent:\x1B[00m Planner\n", &mut sink);
        let _ = state.finish(&mut sink);
        assert_eq!(sink.log(), ["# Agent: Planner"]);
        assert_eq!(sink.agent(), Some("Planner"));
    }

    #[test]
    fn test_fallback_summary_rendered_from_unclaimed_prefix() {
        let (_, sink) = run(&["[FINAL_REPORT]Intro text\n# Study Roadmap\nWeek 1 plan"]);
        assert_eq!(sink.section(Section::Summary).markdown(), Some("Intro text"));
        assert_eq!(
            sink.section(Section::Schedule).markdown(),
            Some("# Study Roadmap\nWeek 1 plan")
        );
    }

    #[test]
    fn test_marker_with_nothing_after_still_renders() {
        let (summary, sink) = run(&["[FINAL_REPORT]"]);
        assert_eq!(summary.channel, Channel::FinalReport);
        assert_eq!(sink.render_passes(), 1);
        assert!(sink.section(Section::Summary).is_placeholder());
    }
}
