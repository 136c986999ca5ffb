//! Process listing for caller front ends
//!
//! The scanner core never discovers processes by name; this module exists so
//! callers (the CLI here, a picker widget elsewhere) can present a table of
//! candidate processes. Entries are ordered by descending resident set size,
//! the most memory-hungry processes first.

use crate::core::types::{ProcessId, ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::trace;

/// One row of the process table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessEntry {
    pub pid: ProcessId,
    /// Short command name from the `comm` pseudo-file
    pub name: String,
    /// Resident set size in KiB, zero when unreadable
    pub rss_kib: u64,
}

/// Lists live processes, optionally filtered by a substring matched against
/// the command name or the pid.
pub fn list_processes(filter: Option<&str>) -> ScanResult<Vec<ProcessEntry>> {
    list_processes_under(Path::new("/proc"), filter)
}

/// Same as [`list_processes`] over an alternate procfs-shaped tree
pub fn list_processes_under(root: &Path, filter: Option<&str>) -> ScanResult<Vec<ProcessEntry>> {
    let entries = std::fs::read_dir(root).map_err(|err| {
        ScanError::Unsupported(format!("cannot list {}: {err}", root.display()))
    })?;

    let mut processes = Vec::new();

    for entry in entries.flatten() {
        let Some(pid) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<ProcessId>().ok())
            .filter(|pid| *pid > 0)
        else {
            continue;
        };

        // a process can exit between readdir and the comm read; just move on
        let Ok(raw_name) = std::fs::read_to_string(entry.path().join("comm")) else {
            trace!(pid, "process vanished while listing");
            continue;
        };
        let name = raw_name.trim_end_matches('\n').to_string();

        if let Some(needle) = filter {
            if !name.contains(needle) && !pid.to_string().contains(needle) {
                continue;
            }
        }

        let rss_kib = read_rss_kib(&entry.path().join("status"));
        processes.push(ProcessEntry { pid, name, rss_kib });
    }

    processes.sort_by(|a, b| b.rss_kib.cmp(&a.rss_kib).then(a.pid.cmp(&b.pid)));
    Ok(processes)
}

/// `VmRSS:` line of a status pseudo-file, zero when absent or unreadable
fn read_rss_kib(status_path: &Path) -> u64 {
    let Ok(status) = std::fs::read_to_string(status_path) else {
        return 0;
    };

    status
        .lines()
        .find_map(|line| {
            line.strip_prefix("VmRSS:")?
                .split_whitespace()
                .next()?
                .parse()
                .ok()
        })
        .unwrap_or(0)
}
