//! Error types for fleetmux operations.
//!
//! This module provides the error hierarchy using `thiserror` for run
//! lifecycle, history storage, I/O, and CLI commands. Malformed headings,
//! unlabelled agent lines and blank channel content are defined fallbacks,
//! not errors, and never surface here.

use thiserror::Error;

/// Result type alias for fleetmux operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Run lifecycle errors (stream consumption).
    #[error("run error: {0}")]
    Run(#[from] RunError),

    /// Storage-related errors (history persistence).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors (input files, standard streams).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Errors raised by a streaming run.
#[derive(Error, Debug)]
pub enum RunError {
    /// A run was requested without a study topic.
    #[error("please enter a study topic")]
    EmptyTopic,

    /// The underlying stream could not be opened or read.
    #[error("{reason}")]
    Transport {
        /// Reason reported by the transport.
        reason: String,
    },
}

/// Storage-specific errors for history persistence.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// History entry not found by index.
    #[error("history entry not found: {index}")]
    EntryNotFound {
        /// Zero-based index (newest first) that was requested.
        index: usize,
    },
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

impl Error {
    /// Builds a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Database(err.to_string()))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_error_display() {
        assert_eq!(
            RunError::EmptyTopic.to_string(),
            "please enter a study topic"
        );

        let err = RunError::Transport {
            reason: "API connection failed".to_string(),
        };
        assert_eq!(err.to_string(), "API connection failed");
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::EntryNotFound { index: 3 };
        assert_eq!(err.to_string(), "history entry not found: 3");

        let err = StorageError::Database("disk I/O error".to_string());
        assert_eq!(err.to_string(), "database error: disk I/O error");
    }

    #[test]
    fn test_io_error_display() {
        let err = IoError::FileNotFound {
            path: "/tmp/stream.log".to_string(),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/stream.log");

        let err = IoError::ReadFailed {
            path: "/tmp/stream.log".to_string(),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_error_config() {
        let err = Error::config("chunk_size must be > 0");
        assert_eq!(
            err.to_string(),
            "configuration error: chunk_size must be > 0"
        );
    }

    #[test]
    fn test_error_from_run() {
        let err: Error = RunError::EmptyTopic.into();
        assert!(matches!(err, Error::Run(RunError::EmptyTopic)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(IoError::Generic(_))));
    }

    #[test]
    fn test_error_from_command() {
        let err: Error = CommandError::InvalidArgument("--chunk-size".to_string()).into();
        assert!(err.to_string().contains("invalid argument"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let err: Error = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, Error::Storage(StorageError::Database(_))));

        let err: StorageError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, StorageError::Database(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: StorageError = json_err.into();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
