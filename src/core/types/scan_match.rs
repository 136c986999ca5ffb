//! Scan outcome types

use super::Address;
use crate::memory::regions::MemoryRegion;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One needle occurrence found in process memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMatch {
    /// Label of the needle that matched
    pub label: String,
    /// The pattern bytes that were searched for
    pub pattern: Vec<u8>,
    /// Absolute address of the first pattern byte in the target's address space
    pub address: Address,
    /// Newline-bounded bytes surrounding the match inside the searched chunk
    pub context: Option<Vec<u8>>,
    /// The region the match was found in, as reported by the map snapshot
    pub region: MemoryRegion,
}

impl ScanMatch {
    /// Context rendered for humans, lossily when it is not UTF-8
    pub fn context_lossy(&self) -> Cow<'_, str> {
        match &self.context {
            Some(bytes) => String::from_utf8_lossy(bytes),
            None => Cow::Borrowed(""),
        }
    }

    /// Pattern rendered for humans: UTF-8 when it is, hex otherwise
    pub fn pattern_display(&self) -> String {
        match std::str::from_utf8(&self.pattern) {
            Ok(s) => s.to_string(),
            Err(_) => format!("hex:{}", hex::encode(&self.pattern)),
        }
    }
}

/// Ordered sequence of matches from one scan invocation.
///
/// Matches come back in needle-iteration order (the order of the caller's
/// needle set), not in address order. An empty outcome is a successful scan
/// that found nothing.
pub type ScanOutcome = Vec<ScanMatch>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::regions::Permissions;

    fn region() -> MemoryRegion {
        MemoryRegion {
            start: Address::new(0x1000),
            end: Address::new(0x2000),
            perms: Permissions::read_only(),
            pathname: None,
        }
    }

    #[test]
    fn test_context_lossy() {
        let m = ScanMatch {
            label: "greeting".to_string(),
            pattern: b"WORLD".to_vec(),
            address: Address::new(0x1100),
            context: Some(b"hello-WORLD-token".to_vec()),
            region: region(),
        };
        assert_eq!(m.context_lossy(), "hello-WORLD-token");
        assert_eq!(m.pattern_display(), "WORLD");
    }

    #[test]
    fn test_absent_context() {
        let m = ScanMatch {
            label: "raw".to_string(),
            pattern: vec![0x00, 0xff],
            address: Address::new(0x1000),
            context: None,
            region: region(),
        };
        assert_eq!(m.context_lossy(), "");
        assert_eq!(m.pattern_display(), "hex:00ff");
    }

    #[test]
    fn test_serialization_round_trip() {
        let m = ScanMatch {
            label: "greeting".to_string(),
            pattern: b"WORLD".to_vec(),
            address: Address::new(0x1100),
            context: Some(b"hello-WORLD-token".to_vec()),
            region: region(),
        };

        let json = serde_json::to_string(&m).unwrap();
        let back: ScanMatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
