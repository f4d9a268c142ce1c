//! Marker scanner.
//!
//! Finds in-band control markers inside decoded text and splits the text
//! around the first occurrence. Scanning is pure: no state, no side
//! effects. The state machine in [`crate::demux::machine`] decides what to
//! do with the pieces.

use crate::core::StreamMarker;

/// Result of scanning a piece of text for markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan<'a> {
    /// No marker present; the whole text passes through.
    Passthrough(&'a str),
    /// A marker was found.
    Marker {
        /// The marker that matched.
        marker: StreamMarker,
        /// Text preceding the first occurrence.
        before: &'a str,
        /// Text following the first occurrence.
        after: &'a str,
    },
}

/// Scans `text` for the given markers.
///
/// Markers are tried in slice order and the first marker present anywhere in
/// the text wins, regardless of where other markers sit. Only the first
/// occurrence of the winning marker splits the text; later occurrences stay
/// inside `after`.
///
/// # Examples
///
/// ```
/// use fleetmux::core::StreamMarker;
/// use fleetmux::demux::scanner::{Scan, scan};
///
/// let result = scan("log\n[FINAL_REPORT]# Report", &StreamMarker::PRIORITY);
/// assert_eq!(
///     result,
///     Scan::Marker {
///         marker: StreamMarker::FinalReport,
///         before: "log\n",
///         after: "# Report",
///     }
/// );
/// ```
#[must_use]
pub fn scan<'a>(text: &'a str, markers: &[StreamMarker]) -> Scan<'a> {
    for &marker in markers {
        if let Some((before, after)) = text.split_once(marker.token()) {
            return Scan::Marker {
                marker,
                before,
                after,
            };
        }
    }
    Scan::Passthrough(text)
}

/// Returns the length of the longest suffix of `text` that is a proper
/// prefix of one of the marker tokens.
///
/// That suffix may be the start of a marker whose remainder arrives in the
/// next chunk, so the caller holds it back instead of routing it.
#[must_use]
pub fn partial_marker_len(text: &str, markers: &[StreamMarker]) -> usize {
    markers
        .iter()
        .map(|marker| {
            let token = marker.token();
            (1..token.len())
                .rev()
                .find(|&len| text.ends_with(&token[..len]))
                .unwrap_or(0)
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const MARKERS: [StreamMarker; 2] = StreamMarker::PRIORITY;

    #[test]
    fn test_scan_passthrough() {
        assert_eq!(
            scan("just a log line\n", &MARKERS),
            Scan::Passthrough("just a log line\n")
        );
    }

    #[test]
    fn test_scan_memory_marker() {
        assert_eq!(
            scan("done\n[MEMORY_SUMMARY]\nstate", &MARKERS),
            Scan::Marker {
                marker: StreamMarker::MemorySummary,
                before: "done\n",
                after: "\nstate",
            }
        );
    }

    #[test]
    fn test_scan_final_report_takes_precedence_over_position() {
        let text = "a[MEMORY_SUMMARY]b[FINAL_REPORT]c";
        assert_eq!(
            scan(text, &MARKERS),
            Scan::Marker {
                marker: StreamMarker::FinalReport,
                before: "a[MEMORY_SUMMARY]b",
                after: "c",
            }
        );
    }

    #[test]
    fn test_scan_only_first_occurrence_splits() {
        assert_eq!(
            scan("x[FINAL_REPORT]y[FINAL_REPORT]z", &MARKERS),
            Scan::Marker {
                marker: StreamMarker::FinalReport,
                before: "x",
                after: "y[FINAL_REPORT]z",
            }
        );
    }

    #[test]
    fn test_scan_marker_at_edges() {
        assert_eq!(
            scan("[FINAL_REPORT]", &MARKERS),
            Scan::Marker {
                marker: StreamMarker::FinalReport,
                before: "",
                after: "",
            }
        );
    }

    #[test]
    fn test_scan_respects_marker_subset() {
        assert_eq!(
            scan("[FINAL_REPORT]", &[StreamMarker::MemorySummary]),
            Scan::Passthrough("[FINAL_REPORT]")
        );
    }

    #[test_case("log line", 0 ; "no bracket")]
    #[test_case("log [", 1 ; "lone bracket")]
    #[test_case("log [FINAL_", 7 ; "final report prefix")]
    #[test_case("log [MEMORY_SUMMARY", 15 ; "memory prefix one short")]
    #[test_case("log [FINAL_REPORT]", 0 ; "complete marker is not partial")]
    #[test_case("[MEM [F", 2 ; "only the suffix counts")]
    #[test_case("", 0 ; "empty")]
    fn test_partial_marker_len(text: &str, expected: usize) {
        assert_eq!(partial_marker_len(text, &MARKERS), expected);
    }

    #[test]
    fn test_partial_marker_len_multibyte_tail() {
        assert_eq!(partial_marker_len("résumé [FIN", &MARKERS), 4);
        assert_eq!(partial_marker_len("日本語", &MARKERS), 0);
    }
}
