//! Abstract read surface over a target process's address space
//!
//! The scanner is written against this capability rather than any particular
//! OS API, so it stays portable and the whole region/read path can be faked
//! in tests.

use crate::core::types::{Address, ProcessId, ScanResult};
use crate::memory::regions::{MemoryRegion, RegionEnumerator};
use crate::process::ProcessMemory;
use std::io;
use std::path::Path;

/// Capability to list the memory regions of a process and read byte ranges
/// of its address space.
///
/// `regions` failures terminate a scan (the process is gone or off limits);
/// `read_at` failures are per-range and get absorbed by the scanner.
pub trait MemorySource {
    /// Current snapshot of the process's regions, ascending start order
    fn regions(&self) -> ScanResult<Vec<MemoryRegion>>;

    /// Positioned read at an absolute address; may return fewer bytes than
    /// requested when part of the range is unmapped
    fn read_at(&self, address: Address, buf: &mut [u8]) -> io::Result<usize>;
}

/// The procfs-backed [`MemorySource`]: map description for regions, positioned
/// reads on the memory pseudo-file for bytes
#[derive(Debug)]
pub struct ProcSource {
    pid: ProcessId,
    enumerator: RegionEnumerator,
    mem: ProcessMemory,
}

impl ProcSource {
    /// Attaches read-only to a live process.
    ///
    /// Fails with `ProcessUnavailable` when the memory pseudo-file cannot be
    /// opened (exited process, insufficient privilege, not ptrace-attachable)
    /// and with `Unsupported` where no procfs-style surface exists.
    pub fn attach(pid: ProcessId) -> ScanResult<Self> {
        Ok(ProcSource {
            pid,
            enumerator: RegionEnumerator::new(),
            mem: ProcessMemory::open(pid)?,
        })
    }

    /// Attaches under an alternate procfs-shaped tree, for tests
    pub fn attach_under(root: &Path, pid: ProcessId) -> ScanResult<Self> {
        Ok(ProcSource {
            pid,
            enumerator: RegionEnumerator::with_root(root),
            mem: ProcessMemory::open_under(root, pid)?,
        })
    }

    /// The process this source reads from
    pub fn pid(&self) -> ProcessId {
        self.pid
    }
}

impl MemorySource for ProcSource {
    fn regions(&self) -> ScanResult<Vec<MemoryRegion>> {
        self.enumerator.enumerate(self.pid)
    }

    fn read_at(&self, address: Address, buf: &mut [u8]) -> io::Result<usize> {
        self.mem.read_at(address, buf)
    }
}
