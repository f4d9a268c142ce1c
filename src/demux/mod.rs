//! Streaming channel demultiplexer.
//!
//! Decoded text chunks flow through four stages:
//!
//! - **Scanner**: finds `[FINAL_REPORT]` / `[MEMORY_SUMMARY]` markers
//! - **Machine**: tracks the active channel and routes text to it
//! - **Splitter**: re-partitions the final report into named sections
//! - **Sink**: receives log lines, section renders and the memory summary

pub mod machine;
pub mod scanner;
pub mod sink;
pub mod splitter;
pub mod telemetry;

pub use machine::{DemuxOptions, RunState, RunSummary};
pub use scanner::{Scan, partial_marker_len, scan};
pub use sink::{Dashboard, PLACEHOLDER, Region, RunSink, RunStatus};
pub use splitter::{SectionMap, binding_section, is_heading_candidate, split_sections};
pub use telemetry::{extract_agent, strip_ansi};
