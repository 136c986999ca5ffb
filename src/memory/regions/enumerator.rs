//! Memory map enumeration from the procfs map description

use crate::core::types::{Address, ProcessId, ScanError, ScanResult};
use crate::memory::regions::{MemoryRegion, Permissions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::trace;

/// Parses one map line of the form `<start>-<end> <quad> ...`.
///
/// Returns `None` for lines that do not match this shape. Skipping those is
/// the tolerance policy for non-memory metadata and malformed entries, not an
/// error condition.
pub fn parse_maps_line(line: &str) -> Option<MemoryRegion> {
    let mut fields = line.split_whitespace();

    let range = fields.next()?;
    let (start, end) = range.split_once('-')?;
    let start = Address::from_str(start).ok()?;
    let end = Address::from_str(end).ok()?;
    if start >= end {
        return None;
    }

    let perms = Permissions::parse(fields.next()?)?;

    // offset, dev and inode fields are not interesting here; the pathname is
    // everything after them and may itself contain spaces
    let pathname = match fields.nth(3) {
        Some(first) => {
            let mut path = first.to_string();
            for part in fields {
                path.push(' ');
                path.push_str(part);
            }
            Some(path)
        }
        None => None,
    };

    Some(MemoryRegion {
        start,
        end,
        perms,
        pathname,
    })
}

/// Parses a whole map description, silently skipping lines that do not look
/// like region entries. Order is preserved as reported by the OS (ascending
/// start address).
pub fn parse_maps(text: &str) -> Vec<MemoryRegion> {
    text.lines()
        .filter_map(|line| {
            let region = parse_maps_line(line);
            if region.is_none() && !line.trim().is_empty() {
                trace!(line, "skipping unparseable map line");
            }
            region
        })
        .collect()
}

/// Enumerates memory regions of a target process from its map description.
///
/// Opens the description, parses it and returns; no handle is retained after
/// `enumerate` returns.
#[derive(Debug, Clone)]
pub struct RegionEnumerator {
    procfs_root: PathBuf,
}

impl RegionEnumerator {
    /// Enumerator over the real procfs mount
    pub fn new() -> Self {
        RegionEnumerator {
            procfs_root: PathBuf::from("/proc"),
        }
    }

    /// Enumerator over an alternate procfs-shaped tree, for tests
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        RegionEnumerator {
            procfs_root: root.into(),
        }
    }

    /// Path of the map description for a process
    pub fn maps_path(&self, pid: ProcessId) -> PathBuf {
        self.procfs_root.join(pid.to_string()).join("maps")
    }

    /// Returns the process's regions in ascending start order.
    ///
    /// Fails with `ProcessUnavailable` when the map description cannot be
    /// opened (process exited or permission denied).
    pub fn enumerate(&self, pid: ProcessId) -> ScanResult<Vec<MemoryRegion>> {
        if pid <= 0 {
            return Err(ScanError::invalid_argument(format!(
                "process id must be positive, got {pid}"
            )));
        }

        let path = self.maps_path(pid);
        let text = std::fs::read_to_string(&path).map_err(|err| {
            ScanError::process_unavailable(pid, format!("cannot open {}: {err}", path.display()))
        })?;

        Ok(parse_maps(&text))
    }
}

impl Default for RegionEnumerator {
    fn default() -> Self {
        RegionEnumerator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_single_line() {
        let region =
            parse_maps_line("00400000-00401000 r-xp 00000000 08:01 1234 /bin/x").unwrap();
        assert_eq!(region.start, Address::new(0x400000));
        assert_eq!(region.end, Address::new(0x401000));
        assert!(region.perms.read);
        assert!(!region.perms.write);
        assert!(region.perms.execute);
        assert!(!region.perms.shared);
        assert_eq!(region.pathname.as_deref(), Some("/bin/x"));
    }

    #[test]
    fn test_parse_line_without_pathname() {
        let region = parse_maps_line("7ffd1000-7ffd2000 rw-p 00000000 00:00 0").unwrap();
        assert_eq!(region.pathname, None);
        assert!(region.perms.write);
    }

    #[test]
    fn test_parse_line_with_spaces_in_pathname() {
        let region = parse_maps_line(
            "7f0000000000-7f0000001000 r--p 00000000 08:01 99 /tmp/with space.so",
        )
        .unwrap();
        assert_eq!(region.pathname.as_deref(), Some("/tmp/with space.so"));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        assert!(parse_maps_line("garbage line").is_none());
        assert!(parse_maps_line("").is_none());
        assert!(parse_maps_line("00400000-00401000").is_none());
        assert!(parse_maps_line("00400000-00401000 rwxz 0 0 0").is_none());
        // start must be below end
        assert!(parse_maps_line("00401000-00400000 r--p 0 0 0").is_none());
        assert!(parse_maps_line("zzz-00401000 r--p 0 0 0").is_none());
    }

    #[test]
    fn test_parse_maps_mixes_good_and_bad_lines() {
        let text = "00400000-00401000 r-xp 00000000 08:01 1234 /bin/x\n\
                    garbage line\n\
                    00601000-00602000 rw-p 00001000 08:01 1234 /bin/x\n";
        let regions = parse_maps(text);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].start, Address::new(0x400000));
        assert_eq!(regions[1].start, Address::new(0x601000));
    }

    #[test]
    fn test_enumerate_rejects_bad_pid() {
        let enumerator = RegionEnumerator::new();
        assert!(matches!(
            enumerator.enumerate(0),
            Err(ScanError::InvalidArgument(_))
        ));
        assert!(matches!(
            enumerator.enumerate(-5),
            Err(ScanError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_enumerate_missing_process() {
        let dir = tempfile::tempdir().unwrap();
        let enumerator = RegionEnumerator::with_root(dir.path());
        match enumerator.enumerate(4242) {
            Err(ScanError::ProcessUnavailable { pid, .. }) => assert_eq!(pid, 4242),
            other => panic!("expected ProcessUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_enumerate_from_fixture_tree() {
        let dir = tempfile::tempdir().unwrap();
        let proc_dir = dir.path().join("77");
        std::fs::create_dir_all(&proc_dir).unwrap();
        std::fs::write(
            proc_dir.join("maps"),
            "00400000-00401000 r-xp 00000000 08:01 1 /bin/x\n\
             not a region\n\
             00500000-00502000 ---p 00000000 00:00 0\n",
        )
        .unwrap();

        let enumerator = RegionEnumerator::with_root(dir.path());
        let regions = enumerator.enumerate(77).unwrap();
        assert_eq!(regions.len(), 2);
        assert!(regions[0].is_readable());
        assert!(!regions[1].is_readable());
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_enumerate_self() {
        let enumerator = RegionEnumerator::new();
        let regions = enumerator.enumerate(std::process::id() as ProcessId).unwrap();
        assert!(!regions.is_empty());
        // OS-native ordering is ascending by start address
        for pair in regions.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
    }
}
