//! Memory address wrapper type with hex parsing

use super::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents a virtual-memory address with type-safe operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub u64);

impl Address {
    /// Creates a new address from a u64 value
    pub const fn new(value: u64) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Adds a byte offset to the address
    pub const fn add(&self, offset: u64) -> Self {
        Address(self.0 + offset)
    }

    /// Byte distance to a higher address, zero if `other` is below
    pub const fn distance_to(&self, other: Address) -> u64 {
        other.0.saturating_sub(self.0)
    }

    /// Returns the raw u64 value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for Address {
    type Err = ScanError;

    fn from_str(s: &str) -> ScanResult<Self> {
        let s = s.trim();

        // Map addresses come as bare hex; accept an explicit 0x prefix too
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        u64::from_str_radix(digits, 16)
            .map(Address::new)
            .map_err(|_| ScanError::invalid_argument(format!("invalid address: {s:?}")))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parsing() {
        assert_eq!(Address::from_str("0x1000").unwrap(), Address::new(0x1000));
        assert_eq!(Address::from_str("0X1000").unwrap(), Address::new(0x1000));
        assert_eq!(
            Address::from_str("7f8a1c000000").unwrap(),
            Address::new(0x7f8a_1c00_0000)
        );
        assert!(Address::from_str("not-an-address").is_err());
    }

    #[test]
    fn test_address_arithmetic() {
        let addr = Address::new(0x1000);
        assert_eq!(addr.add(0x10), Address::new(0x1010));
        assert_eq!(addr.distance_to(Address::new(0x1800)), 0x800);
        assert_eq!(addr.distance_to(Address::new(0x800)), 0);
    }

    #[test]
    fn test_address_display() {
        let addr = Address::new(0xDEADBEEF);
        assert_eq!(format!("{}", addr), "0xdeadbeef");
        assert_eq!(format!("{:x}", addr), "0xdeadbeef");
        assert_eq!(format!("{:X}", addr), "0xDEADBEEF");
    }

    #[test]
    fn test_null_address() {
        assert!(Address::null().is_null());
        assert!(!Address::new(0x400000).is_null());
    }
}
