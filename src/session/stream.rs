//! Async driver over a byte stream.
//!
//! Transports that deliver the fleet output as a `futures` stream (an HTTP
//! response body, a channel receiver) are consumed here. Awaiting the next
//! item is the only suspension point; each item is demultiplexed before the
//! next one is requested.

use crate::demux::RunSink;
use crate::error::{Result, RunError};
use crate::session::{RunOutcome, RunRequest, Session};
use crate::storage::HistoryStore;
use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use std::pin::pin;

/// Runs to completion over a stream of byte chunks.
///
/// An `Err` item fails the run with that error's message.
///
/// # Errors
///
/// Returns [`RunError::EmptyTopic`] for a blank topic. Failures after the
/// run started are reported as [`RunOutcome::Failed`].
///
/// # Examples
///
/// ```
/// use fleetmux::demux::Dashboard;
/// use fleetmux::session::{RunRequest, Session, stream::run_stream};
/// use fleetmux::storage::MemoryHistory;
/// use futures_util::stream;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let chunks = stream::iter([
///     Ok::<_, std::io::Error>(b"[FINAL_RE".to_vec()),
///     Ok(b"PORT]done".to_vec()),
/// ]);
/// let mut session = Session::new(MemoryHistory::new());
/// let mut dashboard = Dashboard::new();
/// let outcome = run_stream(&mut session, RunRequest::new("Topology"), chunks, &mut dashboard)
///     .await
///     .unwrap();
/// assert_eq!(outcome.summary().unwrap().report, "done");
/// # }
/// ```
pub async fn run_stream<H, S, St, B, E>(
    session: &mut Session<H>,
    request: RunRequest,
    stream: St,
    sink: S,
) -> Result<RunOutcome>
where
    H: HistoryStore,
    S: RunSink,
    St: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut run = session.start(request, sink)?;
    let mut stream = pin!(stream);
    while let Some(item) = stream.next().await {
        match item {
            Ok(bytes) => run.push_bytes(bytes.as_ref()),
            Err(e) => {
                return Ok(run.fail(RunError::Transport {
                    reason: e.to_string(),
                }));
            }
        }
    }
    Ok(run.complete())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demux::{Dashboard, RunStatus};
    use crate::storage::MemoryHistory;
    use futures_util::stream;

    #[tokio::test]
    async fn test_stream_completes() {
        let chunks = stream::iter(vec![
            Ok::<_, String>("Agent: Planner\n".as_bytes().to_vec()),
            Ok("[FINAL_REPORT]\n# Optimized Roadmap\n".as_bytes().to_vec()),
            Ok("Day 1\n[MEMORY_SUM".as_bytes().to_vec()),
            Ok("MARY]\nprogress: 40%".as_bytes().to_vec()),
        ]);
        let mut session = Session::new(MemoryHistory::new());
        let mut dashboard = Dashboard::new();

        let request = RunRequest::new("Calculus");
        let outcome = run_stream(&mut session, request, chunks, &mut dashboard)
            .await
            .unwrap();

        let summary = outcome.summary().unwrap();
        assert_eq!(summary.report, "\n# Optimized Roadmap\nDay 1\n");
        assert_eq!(summary.memory, "\nprogress: 40%");
        assert_eq!(dashboard.run_status(), RunStatus::Complete);
        assert_eq!(session.history().len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stream_error_fails_run() {
        let chunks = stream::iter(vec![
            Ok(b"Agent: Scout\n".to_vec()),
            Err("API connection failed"),
        ]);
        let mut session = Session::new(MemoryHistory::new());
        let mut dashboard = Dashboard::new();

        let request = RunRequest::new("Physics");
        let outcome = run_stream(&mut session, request, chunks, &mut dashboard)
            .await
            .unwrap();

        assert!(!outcome.is_completed());
        assert_eq!(
            dashboard.log().last().map(String::as_str),
            Some("ERROR: API connection failed")
        );
        assert!(session.history().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_stream_blank_topic() {
        let chunks = stream::iter(Vec::<std::result::Result<Vec<u8>, String>>::new());
        let mut session = Session::new(MemoryHistory::new());
        let result = run_stream(&mut session, RunRequest::new(""), chunks, Dashboard::new()).await;
        assert!(result.is_err());
    }
}
