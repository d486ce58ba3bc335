use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Codec operation that was in progress when an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Open,
    Seek,
    Read,
    Schema,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Open => "open",
            Operation::Seek => "seek",
            Operation::Read => "read",
            Operation::Schema => "schema",
        };
        f.write_str(name)
    }
}

/// Core error type for pq operations
#[derive(Error, Debug)]
pub enum PqError {
    /// The input path does not exist
    #[error("{}: no such file", path.display())]
    NotFound { path: PathBuf },

    /// Magic marker mismatch or a file below the minimum frame size
    #[error("{}: not a valid Parquet file ({reason})", path.display())]
    InvalidFormat { path: PathBuf, reason: String },

    /// Footer unreadable or a decode fault raised by the codec
    #[error("{}: file appears to be corrupt ({op} failed: {message})", path.display())]
    CorruptFile {
        path: PathBuf,
        op: Operation,
        message: String,
    },

    /// Zero rows where rows are required
    #[error("{}: file is empty", path.display())]
    EmptyFile { path: PathBuf },

    /// The footer carries no schema fields
    #[error("{}: file has no schema", path.display())]
    NoSchema { path: PathBuf },

    /// A specific row could not be turned into a record
    #[error("failed to reconstruct row {row}: {message}")]
    ReconstructFailed { row: u64, message: String },

    /// I/O or encoding failure while emitting an output file
    #[error("{}: write failed: {message}", path.display())]
    WriteFailed { path: PathBuf, message: String },

    /// The handle was used after `close`
    #[error("{}: file handle is closed", path.display())]
    Closed { path: PathBuf },

    /// IO errors from file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow errors from Arrow operations
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// Parquet format errors
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// Type conversion errors
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Invalid argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for pq operations
pub type Result<T> = std::result::Result<T, PqError>;

impl PqError {
    pub fn not_found(path: &Path) -> Self {
        PqError::NotFound {
            path: path.to_path_buf(),
        }
    }

    pub fn invalid_format<S: Into<String>>(path: &Path, reason: S) -> Self {
        PqError::InvalidFormat {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn corrupt<S: Into<String>>(path: &Path, op: Operation, message: S) -> Self {
        PqError::CorruptFile {
            path: path.to_path_buf(),
            op,
            message: message.into(),
        }
    }

    pub fn empty_file(path: &Path) -> Self {
        PqError::EmptyFile {
            path: path.to_path_buf(),
        }
    }

    pub fn write_failed<S: Into<String>>(path: &Path, message: S) -> Self {
        PqError::WriteFailed {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a new schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        PqError::Schema(msg.into())
    }

    /// Create a new conversion error
    pub fn conversion<S: Into<String>>(msg: S) -> Self {
        PqError::Conversion(msg.into())
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        PqError::InvalidArgument(msg.into())
    }

    /// Path of the file involved, when the error is tied to one
    pub fn path(&self) -> Option<&Path> {
        match self {
            PqError::NotFound { path }
            | PqError::InvalidFormat { path, .. }
            | PqError::CorruptFile { path, .. }
            | PqError::EmptyFile { path }
            | PqError::NoSchema { path }
            | PqError::WriteFailed { path, .. }
            | PqError::Closed { path } => Some(path.as_path()),
            _ => None,
        }
    }
}
