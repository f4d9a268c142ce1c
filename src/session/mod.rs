//! Run lifecycle.
//!
//! A [`Session`] owns the history store and the run configuration. Starting
//! a run hands out an [`ActiveRun`] that mutably borrows the session, so at
//! most one run is active at a time. The active run owns a fresh decoder and
//! [`RunState`]; it is consumed by [`ActiveRun::complete`] or
//! [`ActiveRun::fail`], which both report a [`RunOutcome`].

#[cfg(feature = "stream")]
pub mod stream;

use crate::core::HistoryEntry;
use crate::demux::{DemuxOptions, RunSink, RunState, RunStatus, RunSummary};
use crate::error::{Error, Result, RunError};
use crate::io::{ChunkReader, DEFAULT_CHUNK_SIZE, Utf8StreamDecoder};
use crate::storage::HistoryStore;
use serde::Serialize;
use std::fmt::Display;
use std::io::Read;
use tracing::{debug, info, warn};

/// Agent display while a run starts up.
pub const AGENT_COORDINATING: &str = "Coordinating...";

/// Agent display after a completed run.
pub const AGENT_IDLE: &str = "Fleet Idle";

/// Agent display after a failed run.
pub const AGENT_FAILED: &str = "Failed";

/// Difficulty used when none is given.
pub const DEFAULT_DIFFICULTY: &str = "Intermediate";

/// Study time used when none is given.
pub const DEFAULT_STUDY_TIME: &str = "2 hours";

/// Parameters of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Study topic; must not be blank.
    pub topic: String,
    /// Free-form notes forwarded to the fleet.
    pub notes: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Study time label.
    pub study_time: String,
}

impl RunRequest {
    /// Creates a request with default difficulty and study time.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            notes: String::new(),
            difficulty: DEFAULT_DIFFICULTY.to_string(),
            study_time: DEFAULT_STUDY_TIME.to_string(),
        }
    }

    /// Sets the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Sets the difficulty label.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    /// Sets the study time label.
    #[must_use]
    pub fn with_study_time(mut self, study_time: impl Into<String>) -> Self {
        self.study_time = study_time.into();
        self
    }
}

/// Tunables for runs and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Bytes per read in the synchronous driver.
    pub chunk_size: usize,
    /// Strip ANSI escape sequences from telemetry lines.
    pub strip_ansi: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            strip_ansi: false,
        }
    }
}

impl RunConfig {
    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero chunk size.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk size must be greater than zero"));
        }
        Ok(())
    }

    /// Demultiplexer options derived from this configuration.
    #[must_use]
    pub const fn demux_options(&self) -> DemuxOptions {
        DemuxOptions {
            strip_ansi: self.strip_ansi,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The stream ended normally and the run was recorded.
    Completed(RunSummary),
    /// The run was abandoned.
    Failed {
        /// Message shown to the user.
        error: String,
    },
}

impl RunOutcome {
    /// Whether the run completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Summary of a completed run.
    #[must_use]
    pub const fn summary(&self) -> Option<&RunSummary> {
        match self {
            Self::Completed(summary) => Some(summary),
            Self::Failed { .. } => None,
        }
    }
}

/// Owner of the history store; starts runs one at a time.
///
/// # Examples
///
/// ```
/// use fleetmux::demux::Dashboard;
/// use fleetmux::session::{RunRequest, Session};
/// use fleetmux::storage::{HistoryStore, MemoryHistory};
///
/// let mut session = Session::new(MemoryHistory::new());
/// let mut dashboard = Dashboard::new();
///
/// let input = "Agent: Planner\n[FINAL_REPORT]# Study Roadmap\nWeek 1".as_bytes();
/// let outcome = session
///     .run(RunRequest::new("Graph theory"), input, &mut dashboard)
///     .unwrap();
///
/// assert!(outcome.is_completed());
/// assert_eq!(session.history().get(0).unwrap().topic, "Graph theory");
/// ```
#[derive(Debug)]
pub struct Session<H> {
    history: H,
    config: RunConfig,
}

impl<H: HistoryStore> Session<H> {
    /// Creates a session with the default configuration.
    pub fn new(history: H) -> Self {
        Self {
            history,
            config: RunConfig::default(),
        }
    }

    /// Creates a session with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn with_config(history: H, config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { history, config })
    }

    /// Active configuration.
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// History store.
    pub const fn history(&self) -> &H {
        &self.history
    }

    /// Starts a run, resetting the sink and logging the mission preamble.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::EmptyTopic`] for a blank topic. The sink is not
    /// touched in that case.
    pub fn start<S: RunSink>(
        &mut self,
        request: RunRequest,
        mut sink: S,
    ) -> Result<ActiveRun<'_, H, S>> {
        let topic = request.topic.trim();
        if topic.is_empty() {
            return Err(RunError::EmptyTopic.into());
        }
        let request = RunRequest {
            topic: topic.to_string(),
            ..request
        };

        debug!(
            topic = %request.topic,
            difficulty = %request.difficulty,
            notes_len = request.notes.len(),
            "run started"
        );

        sink.reset();
        sink.status(RunStatus::Active);
        sink.active_agent(AGENT_COORDINATING);
        sink.log_line(&format!(
            "MISSION INITIATED: {}",
            request.topic.to_uppercase()
        ));
        sink.log_line(&format!("DIFFICULTY: {}", request.difficulty));
        sink.log_line("DEPLOYING: Multi-Agent Fleet...");

        let state = RunState::with_options(self.config.demux_options());
        Ok(ActiveRun {
            session: self,
            request,
            sink,
            state,
            decoder: Utf8StreamDecoder::new(),
            chunks: 0,
        })
    }

    /// Runs to completion over a blocking reader.
    ///
    /// Reads `chunk_size` bytes at a time. A read error fails the run.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::EmptyTopic`] for a blank topic. Failures after
    /// the run started are reported as [`RunOutcome::Failed`].
    pub fn run<R: Read, S: RunSink>(
        &mut self,
        request: RunRequest,
        input: R,
        sink: S,
    ) -> Result<RunOutcome> {
        let chunk_size = self.config.chunk_size;
        let mut run = self.start(request, sink)?;
        for chunk in ChunkReader::new(input, chunk_size) {
            match chunk {
                Ok(bytes) => run.push_bytes(&bytes),
                Err(e) => {
                    return Ok(run.fail(RunError::Transport {
                        reason: e.to_string(),
                    }));
                }
            }
        }
        Ok(run.complete())
    }
}

/// A run in progress.
///
/// Holds the session borrow for its whole lifetime. Dropping it without
/// calling [`ActiveRun::complete`] or [`ActiveRun::fail`] abandons the run
/// silently.
#[derive(Debug)]
pub struct ActiveRun<'s, H, S> {
    session: &'s mut Session<H>,
    request: RunRequest,
    sink: S,
    state: RunState,
    decoder: Utf8StreamDecoder,
    chunks: usize,
}

impl<H: HistoryStore, S: RunSink> ActiveRun<'_, H, S> {
    /// Request this run was started with (topic trimmed).
    pub const fn request(&self) -> &RunRequest {
        &self.request
    }

    /// Demultiplexer state so far.
    pub const fn state(&self) -> &RunState {
        &self.state
    }

    /// Number of chunks consumed.
    pub const fn chunks(&self) -> usize {
        self.chunks
    }

    /// Consumes one raw byte chunk.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.chunks += 1;
        let text = self.decoder.decode(bytes);
        if !text.is_empty() {
            self.state.feed(&text, &mut self.sink);
        }
    }

    /// Consumes one already-decoded chunk.
    pub fn push_str(&mut self, text: &str) {
        self.chunks += 1;
        self.state.feed(text, &mut self.sink);
    }

    /// Ends the run normally and records it in history.
    ///
    /// A history write failure turns the run into a failed one.
    pub fn complete(self) -> RunOutcome {
        let Self {
            session,
            request,
            mut sink,
            state,
            decoder,
            chunks,
        } = self;
        let summary = drain(state, decoder, &mut sink);

        let entry = HistoryEntry::new(
            request.topic.clone(),
            summary.report.clone(),
            request.difficulty,
            request.study_time,
        );
        if let Err(e) = session.history.push(entry) {
            return report_failure(&mut sink, &e);
        }

        sink.status(RunStatus::Complete);
        sink.active_agent(AGENT_IDLE);
        info!(
            topic = %request.topic,
            chunks,
            report_len = summary.report.len(),
            telemetry_lines = summary.telemetry_lines,
            "run completed"
        );
        RunOutcome::Completed(summary)
    }

    /// Abandons the run with an error.
    ///
    /// Regions keep what was last rendered; undecoded bytes and held-back
    /// marker text are dropped. Nothing is saved.
    pub fn fail(self, error: impl Display) -> RunOutcome {
        let Self {
            mut sink,
            state,
            decoder,
            ..
        } = self;
        if decoder.pending() > 0 {
            debug!(bytes = decoder.pending(), "dropping undecoded bytes");
        }
        state.abandon(&mut sink);
        report_failure(&mut sink, &error)
    }
}

/// Flushes the decoder and demultiplexer into the sink.
fn drain<S: RunSink>(
    mut state: RunState,
    mut decoder: Utf8StreamDecoder,
    sink: &mut S,
) -> RunSummary {
    let tail = decoder.finish();
    if !tail.is_empty() {
        state.feed(&tail, sink);
    }
    state.finish(sink)
}

fn report_failure<S: RunSink>(sink: &mut S, error: &dyn Display) -> RunOutcome {
    warn!(%error, "run failed");
    sink.log_line(&format!("ERROR: {error}"));
    sink.status(RunStatus::Failed);
    sink.active_agent(AGENT_FAILED);
    RunOutcome::Failed {
        error: error.to_string(),
    }
}
