//! Core module containing fundamental types for memgrep
//!
//! This module provides the building blocks used throughout the scanner:
//! address handling, needle definitions, scan outcomes and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{Address, Needle, ProcessId, ScanError, ScanMatch, ScanOutcome, ScanResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
