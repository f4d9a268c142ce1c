//! Telemetry line helpers.
//!
//! Telemetry is rendered line by line. These helpers recognise the active
//! agent label and strip terminal colour codes from captured process output.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Literal label that precedes an agent name in a log line.
pub const AGENT_LABEL: &str = "Agent:";

/// Extracts the agent name from a log line.
///
/// Returns the text after the first `Agent:` label (up to any repeated
/// label), trimmed. Lines without the label, or with nothing after it,
/// yield `None`.
///
/// # Examples
///
/// ```
/// use fleetmux::demux::telemetry::extract_agent;
///
/// assert_eq!(
///     extract_agent("Agent: Researcher-7 started task"),
///     Some("Researcher-7 started task")
/// );
/// assert_eq!(extract_agent("no label here"), None);
/// ```
#[must_use]
pub fn extract_agent(line: &str) -> Option<&str> {
    let name = line.split(AGENT_LABEL).nth(1)?.trim();
    (!name.is_empty()).then_some(name)
}

/// Removes ANSI escape sequences from a line.
///
/// Borrows the input unchanged when it holds no escape character.
#[must_use]
pub fn strip_ansi(line: &str) -> Cow<'_, str> {
    static ANSI_ESCAPE: OnceLock<Regex> = OnceLock::new();

    if !line.contains('\x1B') {
        return Cow::Borrowed(line);
    }
    #[allow(clippy::expect_used)]
    let pattern = ANSI_ESCAPE.get_or_init(|| {
        Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("valid regex")
    });
    pattern.replace_all(line, "")
}
