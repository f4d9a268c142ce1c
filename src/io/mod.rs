//! I/O utilities for fleetmux.
//!
//! Provides chunked reading of run input and incremental UTF-8 decoding of
//! the resulting byte chunks.

pub mod decoder;
pub mod reader;

pub use decoder::Utf8StreamDecoder;
pub use reader::{ChunkReader, DEFAULT_CHUNK_SIZE, STDIN_PATH, open_input, read_text};
