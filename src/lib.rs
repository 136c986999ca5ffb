//! memgrep library: named string search over another process's memory
//!
//! The crate enumerates a target process's memory regions from its map
//! description, reads the readable ones in overlapping chunks, and searches
//! them for caller-supplied named byte patterns, reporting each hit with the
//! newline-bounded line around it.

pub mod core;
pub mod memory;
pub mod process;

// Re-export main types from the core module
pub use crate::core::types::{
    Address, Needle, ProcessId, ScanError, ScanMatch, ScanOutcome, ScanResult,
};

pub use memory::{
    CancelToken, MemoryRegion, MemoryScanner, MemorySource, NeedlePolicy, Permissions,
    ProcSource, RegionEnumerator, ScanMode, ScanOptions,
};
pub use process::{list_processes, ProcessEntry, ProcessMemory};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(crate::core::VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_reexports_accessible() {
        let addr = Address::new(0x1000);
        assert_eq!(addr.as_u64(), 0x1000);

        let needle = Needle::new("greeting", b"WORLD".to_vec()).unwrap();
        assert_eq!(needle.label, "greeting");

        let options = ScanOptions::default();
        assert_eq!(options.mode, ScanMode::AllMatches);
        assert_eq!(options.per_needle, NeedlePolicy::FirstMatch);
    }
}
