//! Read-only handle on a target process's memory with RAII semantics

use crate::core::types::{Address, ProcessId, ScanError, ScanResult};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only handle on the memory pseudo-file of a target process.
///
/// The underlying file is closed when the handle is dropped; the scanner
/// never holds one across scan invocations.
pub struct ProcessMemory {
    file: File,
    pid: ProcessId,
}

impl ProcessMemory {
    /// Opens the memory of a process under the real procfs mount.
    ///
    /// Fails with `ProcessUnavailable` when the process has exited or the
    /// caller lacks the privilege to inspect it, and with `Unsupported` on
    /// hosts without a procfs-style read surface.
    pub fn open(pid: ProcessId) -> ScanResult<Self> {
        Self::open_under(Path::new("/proc"), pid)
    }

    /// Opens the memory pseudo-file under an alternate procfs-shaped tree
    pub fn open_under(root: &Path, pid: ProcessId) -> ScanResult<Self> {
        if pid <= 0 {
            return Err(ScanError::invalid_argument(format!(
                "process id must be positive, got {pid}"
            )));
        }

        if !cfg!(unix) {
            return Err(ScanError::Unsupported(
                "process memory reads require a unix procfs".to_string(),
            ));
        }

        let path = Self::mem_path(root, pid);
        let file = File::open(&path).map_err(|err| {
            ScanError::process_unavailable(pid, format!("cannot open {}: {err}", path.display()))
        })?;

        Ok(ProcessMemory { file, pid })
    }

    fn mem_path(root: &Path, pid: ProcessId) -> PathBuf {
        root.join(pid.to_string()).join("mem")
    }

    /// The process this handle refers to
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Positioned read at an absolute address of the target's address space.
    ///
    /// Returns the number of bytes read, which may be short when part of the
    /// range is no longer mapped. Failures here are per-range; callers absorb
    /// them and move on.
    pub fn read_at(&self, address: Address, buf: &mut [u8]) -> io::Result<usize> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_at(buf, address.as_u64())
        }
        #[cfg(not(unix))]
        {
            let _ = (address, buf);
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "positioned process reads require a unix procfs",
            ))
        }
    }
}

impl fmt::Debug for ProcessMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessMemory")
            .field("pid", &self.pid)
            .finish()
    }
}

/// Classifies an absorbed read failure for log lines
pub(crate) fn describe_read_error(err: &io::Error) -> &'static str {
    match err.raw_os_error() {
        Some(libc::EIO) => "page not readable (EIO)",
        Some(libc::ESRCH) => "process exited (ESRCH)",
        Some(libc::EPERM) => "permission denied (EPERM)",
        Some(libc::EFAULT) => "address not mapped (EFAULT)",
        _ => "read failed",
    }
}
