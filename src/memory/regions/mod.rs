//! Memory region descriptors for a target process
//!
//! Regions are taken verbatim from the OS-reported memory map: boundaries are
//! never merged or split here, and a region set is built fresh for each scan
//! from the current map snapshot.

pub mod enumerator;

pub use enumerator::{parse_maps, parse_maps_line, RegionEnumerator};

use crate::core::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access permissions of a memory region, parsed from the 4-character
/// permission quad of a map line (`r`/`w`/`x`, then `p` or `s`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    /// `s` in the quad; `p` (copy-on-write private) when false
    pub shared: bool,
}

impl Permissions {
    /// Parses a permission quad such as `r-xp`. Returns `None` when the
    /// string does not have exactly that shape.
    pub fn parse(quad: &str) -> Option<Self> {
        let bytes = quad.as_bytes();
        if bytes.len() != 4 {
            return None;
        }

        let flag = |byte: u8, set: u8| -> Option<bool> {
            match byte {
                b'-' => Some(false),
                b if b == set => Some(true),
                _ => None,
            }
        };

        Some(Permissions {
            read: flag(bytes[0], b'r')?,
            write: flag(bytes[1], b'w')?,
            execute: flag(bytes[2], b'x')?,
            shared: match bytes[3] {
                b's' => true,
                b'p' | b'-' => false,
                _ => return None,
            },
        })
    }

    /// `r--p`
    pub const fn read_only() -> Self {
        Permissions {
            read: true,
            write: false,
            execute: false,
            shared: false,
        }
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.execute { 'x' } else { '-' },
            if self.shared { 's' } else { 'p' },
        )
    }
}

/// A contiguous range of a process's virtual address space with uniform
/// access permissions, as reported by the OS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegion {
    /// First address of the region (inclusive)
    pub start: Address,
    /// One past the last address of the region (exclusive), always above `start`
    pub end: Address,
    /// Permission flags from the map line
    pub perms: Permissions,
    /// Backing path or pseudo-name (`[heap]`, `[stack]`, ...) when reported
    pub pathname: Option<String>,
}

impl MemoryRegion {
    /// Size of the region in bytes
    pub fn len(&self) -> u64 {
        self.start.distance_to(self.end)
    }

    /// A well-formed region is never empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the read permission flag is present
    pub fn is_readable(&self) -> bool {
        self.perms.read
    }

    /// Check if an address falls within this region
    pub fn contains(&self, address: Address) -> bool {
        address >= self.start && address < self.end
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}-{:x} {}", self.start, self.end, self.perms)?;
        if let Some(path) = &self.pathname {
            write!(f, " {path}")?;
        }
        Ok(())
    }
}
