//! Chunked byte sources.
//!
//! A run consumes its input one read at a time. [`ChunkReader`] turns any
//! [`Read`] into an iterator of byte chunks no larger than the configured
//! chunk size, so the demultiplexer sees the same arbitrary boundaries a
//! network stream would produce.

use crate::error::{IoError, Result};
use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::Path;

/// Default read size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Path argument that selects standard input.
pub const STDIN_PATH: &str = "-";

/// Iterator of byte chunks read from a [`Read`].
///
/// Each item is the result of one successful read, at most `chunk_size`
/// bytes long. Reads interrupted by a signal are retried. Iteration stops
/// after end of input or after the first error.
///
/// # Examples
///
/// ```
/// use fleetmux::io::ChunkReader;
///
/// let chunks: Vec<Vec<u8>> = ChunkReader::new(&b"abcdefg"[..], 3)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(chunks, [b"abc".to_vec(), b"def".to_vec(), b"g".to_vec()]);
/// ```
#[derive(Debug)]
pub struct ChunkReader<R> {
    inner: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> ChunkReader<R> {
    /// Wraps a reader. A zero chunk size is raised to one byte.
    pub fn new(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = vec![0; self.chunk_size];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Some(Ok(buf));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Opens a run input: a file path, or standard input for `-`.
///
/// # Errors
///
/// Returns an error if the file doesn't exist or can't be opened.
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn Read>> {
    let path_ref = path.as_ref();
    if path_ref.as_os_str() == STDIN_PATH {
        return Ok(Box::new(io::stdin().lock()));
    }

    let path_str = path_ref.to_string_lossy().to_string();
    if !path_ref.exists() {
        return Err(IoError::FileNotFound { path: path_str }.into());
    }

    let file = File::open(path_ref).map_err(|e| IoError::ReadFailed {
        path: path_str,
        reason: e.to_string(),
    })?;
    Ok(Box::new(file))
}

/// Reads a whole file as text, replacing invalid UTF-8 with U+FFFD.
///
/// # Errors
///
/// Returns an error if the file doesn't exist or can't be read.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    let mut bytes = Vec::new();
    open_input(path_ref)?
        .read_to_end(&mut bytes)
        .map_err(|e| IoError::ReadFailed {
            path: path_str,
            reason: e.to_string(),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    /// Reader that fails after yielding its data once.
    struct Flaky {
        data: Option<Vec<u8>>,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.take() {
                Some(data) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                None => Err(io::Error::new(ErrorKind::ConnectionReset, "reset")),
            }
        }
    }

    #[test]
    fn test_chunks_respect_size() {
        let data = vec![b'x'; 10_000];
        let chunks: Vec<_> = ChunkReader::new(data.as_slice(), 4096)
            .map(|c| c.unwrap().len())
            .collect();
        assert_eq!(chunks, [4096, 4096, 1808]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(ChunkReader::new(io::empty(), 16).count(), 0);
    }

    #[test]
    fn test_zero_chunk_size_is_raised() {
        let chunks: Vec<_> = ChunkReader::new(&b"ab"[..], 0)
            .map(|c| c.unwrap())
            .collect();
        assert_eq!(chunks, [b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn test_error_ends_iteration() {
        let mut reader = ChunkReader::new(
            Flaky {
                data: Some(b"partial".to_vec()),
            },
            64,
        );
        assert_eq!(reader.next().unwrap().unwrap(), b"partial");
        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionReset);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_open_input_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("stream.log");
        std::fs::write(&file_path, "line\n[FINAL_REPORT]body").unwrap();

        let mut content = String::new();
        open_input(&file_path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "line\n[FINAL_REPORT]body");
    }

    #[test]
    fn test_open_input_missing_file() {
        let result = open_input("/nonexistent/path/stream.log");
        assert!(matches!(
            result,
            Err(Error::Io(IoError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_read_text_lossy() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("report.md");
        std::fs::write(&file_path, [b'#', b' ', 0xFF, b'x']).unwrap();

        assert_eq!(read_text(&file_path).unwrap(), "# \u{FFFD}x");
    }
}
