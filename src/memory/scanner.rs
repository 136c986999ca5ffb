//! Needle search across the readable regions of a process
//!
//! The scanner walks regions in map order and reads them in fixed-size chunks
//! that overlap by one byte less than the longest pattern, so a pattern split
//! across a chunk boundary is still found. Matches that start inside the
//! overlap tail are re-read by the next chunk and recorded there, keeping
//! every occurrence reported exactly once.

use crate::core::types::{Needle, ProcessId, ScanError, ScanMatch, ScanOutcome, ScanResult};
use crate::memory::source::{MemorySource, ProcSource};
use crate::process::mem::describe_read_error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Default chunk size for region reads, bounding peak memory for large regions
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Whole-scan termination mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Stop the entire scan at the first hit of any needle
    FirstMatchOnly,
    /// Check every needle against every readable region
    AllMatches,
}

/// Per-needle sub-mode under [`ScanMode::AllMatches`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedlePolicy {
    /// Retire a needle after its first hit; one representative occurrence
    /// per named string, mirroring the interactive use case
    FirstMatch,
    /// Keep reporting every occurrence of each needle, overlapping included
    EveryMatch,
}

/// Cooperative cancellation flag checked between chunk reads.
///
/// No region read is interruptible once issued; cancelling ends the scan at
/// the next chunk boundary and returns the matches recorded so far.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// Requests early termination of any scan holding this token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Options controlling one scan invocation
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub mode: ScanMode,
    pub per_needle: NeedlePolicy,
    pub chunk_size: usize,
    pub cancel: Option<CancelToken>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            mode: ScanMode::AllMatches,
            per_needle: NeedlePolicy::FirstMatch,
            chunk_size: DEFAULT_CHUNK_SIZE,
            cancel: None,
        }
    }
}

/// Scans a process's readable memory for a set of named needles.
///
/// One scan invocation is self-contained: it opens its read surface, walks
/// the current region snapshot once, and holds nothing afterwards. Matches
/// come back in needle-iteration order, not address order.
pub struct MemoryScanner {
    options: ScanOptions,
}

impl MemoryScanner {
    pub fn new(options: ScanOptions) -> Self {
        MemoryScanner { options }
    }

    pub fn with_defaults() -> Self {
        MemoryScanner::new(ScanOptions::default())
    }

    /// Convenience entry point: attach to a live process via procfs and scan.
    ///
    /// The needle set is validated before attaching, so an invalid set causes
    /// no I/O at all.
    pub fn scan_process(&self, pid: ProcessId, needles: &[Needle]) -> ScanResult<ScanOutcome> {
        validate_needles(needles)?;
        let source = ProcSource::attach(pid)?;
        self.scan(&source, needles)
    }

    /// Scans whatever address space the source exposes.
    ///
    /// Fails fast with `InvalidArgument` on a bad needle set and with whatever
    /// `regions()` reports when the process is gone; per-range read failures
    /// are absorbed, so a scan where nothing was readable still completes
    /// with an empty outcome.
    pub fn scan<S: MemorySource>(&self, source: &S, needles: &[Needle]) -> ScanResult<ScanOutcome> {
        validate_needles(needles)?;

        let regions = source.regions()?;
        let chunk = self.options.chunk_size.max(1);
        let longest = needles
            .iter()
            .map(|n| n.pattern.len())
            .max()
            .unwrap_or(1);
        let overlap = longest - 1;

        let mut retired = vec![false; needles.len()];
        let mut found: Vec<(usize, ScanMatch)> = Vec::new();
        let mut buf = vec![0u8; chunk + overlap];

        'regions: for region in regions.iter().filter(|r| r.is_readable()) {
            trace!(region = %region, "scanning region");
            let region_len = region.len();
            let mut offset: u64 = 0;

            while offset < region_len {
                if self.is_cancelled() {
                    debug!("scan cancelled, returning partial outcome");
                    break 'regions;
                }

                let want = (region_len - offset).min((chunk + overlap) as u64) as usize;
                let read_addr = region.start.add(offset);

                let n = match source.read_at(read_addr, &mut buf[..want]) {
                    Ok(0) => {
                        offset += chunk as u64;
                        continue;
                    }
                    Ok(n) => n,
                    Err(err) => {
                        // pages can vanish between the map snapshot and the
                        // read; skip the range and keep going
                        debug!(
                            region = %region,
                            offset,
                            "skipping unreadable range: {}",
                            describe_read_error(&err)
                        );
                        offset += chunk as u64;
                        continue;
                    }
                };

                let hay = &buf[..n];
                let last_chunk = offset + chunk as u64 >= region_len;

                for (index, needle) in needles.iter().enumerate() {
                    if retired[index] {
                        continue;
                    }

                    let mut from = 0usize;
                    while let Some(pos) = find_pattern(&hay[from..], &needle.pattern) {
                        let at = from + pos;
                        if at >= chunk && !last_chunk {
                            // overlap tail; the next chunk re-reads this range
                            break;
                        }

                        found.push((
                            index,
                            ScanMatch {
                                label: needle.label.clone(),
                                pattern: needle.pattern.clone(),
                                address: read_addr.add(at as u64),
                                context: Some(extract_context(
                                    hay,
                                    at,
                                    at + needle.pattern.len(),
                                )),
                                region: region.clone(),
                            },
                        ));

                        if self.options.mode == ScanMode::FirstMatchOnly {
                            break 'regions;
                        }
                        if self.options.per_needle == NeedlePolicy::FirstMatch {
                            retired[index] = true;
                            break;
                        }
                        from = at + 1;
                    }
                }

                if retired.iter().all(|done| *done) {
                    // every needle has its representative occurrence
                    break 'regions;
                }

                offset += chunk as u64;
            }
        }

        // needle-iteration order, stable within a needle by discovery order
        found.sort_by_key(|(index, _)| *index);
        Ok(found.into_iter().map(|(_, m)| m).collect())
    }

    fn is_cancelled(&self) -> bool {
        self.options
            .cancel
            .as_ref()
            .map(CancelToken::is_cancelled)
            .unwrap_or(false)
    }
}

fn validate_needles(needles: &[Needle]) -> ScanResult<()> {
    if needles.is_empty() {
        return Err(ScanError::invalid_argument("needle set must not be empty"));
    }
    for needle in needles {
        if needle.label.is_empty() {
            return Err(ScanError::invalid_argument("needle label must not be empty"));
        }
        if needle.pattern.is_empty() {
            return Err(ScanError::invalid_argument(format!(
                "needle {:?} has an empty pattern",
                needle.label
            )));
        }
    }
    Ok(())
}

/// Exact byte-substring search, case-sensitive, no encoding assumptions
fn find_pattern(haystack: &[u8], pattern: &[u8]) -> Option<usize> {
    if pattern.is_empty() || haystack.len() < pattern.len() {
        return None;
    }
    haystack
        .windows(pattern.len())
        .position(|window| window == pattern)
}

/// Inclusive slice between the newline before the match and the newline after
/// it, clamped to the chunk that was being searched
fn extract_context(hay: &[u8], start: usize, end: usize) -> Vec<u8> {
    let mut lo = start;
    while lo > 0 && hay[lo - 1] != b'\n' {
        lo -= 1;
    }

    let mut hi = end;
    while hi < hay.len() && hay[hi] != b'\n' {
        hi += 1;
    }

    hay[lo..hi].to_vec()
}
