//! Custom error types for memgrep

use thiserror::Error;

use super::ProcessId;

/// Main error type for scan operations.
///
/// Per-region read failures are deliberately absent here: they are absorbed
/// inside the scanner and only show up as missing matches for that region.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Process {pid} unavailable: {reason}")]
    ProcessUnavailable { pid: ProcessId, reason: String },

    #[error("Malformed needle on line {line}: {content:?}")]
    MalformedNeedleLine { line: usize, content: String },

    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),
}

/// Result type alias for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    /// Creates an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        ScanError::InvalidArgument(reason.into())
    }

    /// Creates a process unavailable error
    pub fn process_unavailable(pid: ProcessId, reason: impl Into<String>) -> Self {
        ScanError::ProcessUnavailable {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates a malformed needle line error
    pub fn malformed_needle_line(line: usize, content: impl Into<String>) -> Self {
        ScanError::MalformedNeedleLine {
            line,
            content: content.into(),
        }
    }

    /// True when the remedy is retrying with more privilege or a live process
    pub fn is_process_unavailable(&self) -> bool {
        matches!(self, ScanError::ProcessUnavailable { .. })
    }
}
