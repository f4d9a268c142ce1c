//! Core domain models for fleetmux.
//!
//! This module contains the fundamental data types shared by the
//! demultiplexer, the storage layer and the CLI: channels and markers,
//! report sections, and history records. These are pure domain models
//! with no I/O dependencies.

pub mod channel;
pub mod history;
pub mod section;

pub use channel::{Channel, StreamMarker};
pub use history::HistoryEntry;
pub use section::{SECTION_HEADINGS, Section, SectionHeadings};
