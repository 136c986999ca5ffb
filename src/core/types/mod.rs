//! Core type definitions for memgrep
//!
//! Address wrappers, needle definitions, scan outcomes and the error taxonomy
//! used throughout the crate.

mod address;
mod error;
mod needle;
mod scan_match;

// Re-export all public types
pub use address::Address;
pub use error::{ScanError, ScanResult};
pub use needle::{Needle, NEEDLE_DELIMITER};
pub use scan_match::{ScanMatch, ScanOutcome};

/// Opaque identifier of a live OS process. Liveness is never validated up
/// front; a dead process surfaces as `ProcessUnavailable` on first access.
pub type ProcessId = i32;
