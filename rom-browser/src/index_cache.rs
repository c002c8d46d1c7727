//! Per-directory index cache.
//!
//! A cache file lists the accepted entries of one directory, already sorted,
//! one `<tag>:<name>` record per line (`D` directory, `F` launchable). It is
//! only ever replaced as a whole by [`generate`] and read back by [`load`].

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
#[cfg(feature = "tracing")]
use std::time::Instant;

#[cfg(feature = "tracing")]
use tracing::{debug, trace, warn};

use crate::classify::Classifier;
use crate::core::{BrowserError, INDEX_FILE_NAME, OverflowPolicy};
use crate::entry::{IndexedEntry, IndexedKind};
use crate::fs::FileSystem;
use crate::order::sort_entries;
use crate::slots::SlotTable;

/// Coarse scan progress, reported every `progress_interval` scanned objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanProgress {
    /// Objects enumerated so far
    pub scanned: usize,
    /// Accepted entries retained so far
    pub retained: usize,
}

/// Scan tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    /// What to do once the scratch table is full
    pub overflow: OverflowPolicy,
    /// Scanned objects between progress reports (0 disables them)
    pub progress_interval: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            overflow: OverflowPolicy::KeepCounting,
            progress_interval: crate::core::DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

/// Summary of one directory scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Objects enumerated, accepted or not
    pub scanned: usize,
    /// Accepted entries kept in the table
    pub retained: usize,
    /// Accepted entries dropped because the table was full
    pub dropped: usize,
    /// Enumeration items that failed to read
    pub unreadable: usize,
    /// The directory could not be opened; the scan result is empty
    pub dir_unavailable: bool,
    /// Enumeration stopped early under [`OverflowPolicy::StopScan`]
    pub aborted: bool,
}

/// Result of reading a cache file.
#[derive(Clone, Debug)]
pub enum CacheLoad<const N: usize> {
    /// No cache file for this directory (or it cannot be opened)
    Missing,
    /// Cache file read
    Loaded {
        /// Records in file order, at most `N`
        entries: SlotTable<IndexedEntry, N>,
        /// Malformed or filtered records that were skipped
        skipped: usize,
    },
}

impl<const N: usize> CacheLoad<N> {
    /// Whether a cache file was found.
    pub fn is_found(&self) -> bool {
        matches!(self, CacheLoad::Loaded { .. })
    }
}

/// Location of the cache file for `dir`.
pub fn cache_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE_NAME)
}

/// Enumerate `dir`, classify every object and sort the accepted ones.
///
/// Nothing is written. An unreadable directory yields an empty table.
pub fn scan<F, const N: usize>(
    fs: &F,
    dir: &Path,
    classifier: &Classifier,
    opts: ScanOptions,
    mut progress: Option<&mut dyn FnMut(ScanProgress)>,
) -> (SlotTable<IndexedEntry, N>, ScanReport)
where
    F: FileSystem + ?Sized,
{
    let mut table = SlotTable::new();
    let mut report = ScanReport::default();

    let iter = match fs.read_dir(dir) {
        Ok(it) => it,
        Err(err) => {
            trace_dir_unavailable(dir, &err);
            report.dir_unavailable = true;
            return (table, report);
        }
    };

    for item in iter {
        report.scanned += 1;
        match item {
            Ok(e) => {
                if let Some(kind) = classifier.classify(&e.name, e.is_dir).kind() {
                    let kept = table.push(IndexedEntry { kind, name: e.name });
                    if !kept && opts.overflow == OverflowPolicy::StopScan {
                        report.aborted = true;
                        break;
                    }
                }
            }
            Err(_) => report.unreadable += 1,
        }
        if opts.progress_interval > 0 && report.scanned % opts.progress_interval == 0 {
            if let Some(cb) = progress.as_deref_mut() {
                cb(ScanProgress {
                    scanned: report.scanned,
                    retained: table.len(),
                });
            }
        }
    }

    sort_entries(table.as_mut_slice());
    report.retained = table.len();
    report.dropped = table.overflow();
    (table, report)
}

/// Serialize entries in cache-file format.
pub fn serialize<W: Write + ?Sized>(entries: &[IndexedEntry], out: &mut W) -> std::io::Result<()> {
    for e in entries {
        writeln!(out, "{}:{}", e.kind.as_tag(), e.name)?;
    }
    Ok(())
}

/// Parse one cache record, re-validating the name with `classifier`.
///
/// Returns `None` for malformed records, unknown tags, noise names and
/// records whose tag disagrees with the classifier.
pub fn parse_record(line: &str, classifier: &Classifier) -> Option<IndexedEntry> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let (tag, name) = line.split_once(':')?;
    let mut chars = tag.chars();
    let kind = IndexedKind::from_tag(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }
    if classifier.classify(name, kind == IndexedKind::Directory).kind() != Some(kind) {
        return None;
    }
    Some(IndexedEntry {
        kind,
        name: name.to_string(),
    })
}

/// Replace the cache file of `dir` with `entries`.
///
/// A failed write removes the partial file so a later [`load`] reports the
/// cache as missing rather than trusting a truncated one.
pub fn write<F>(fs: &F, dir: &Path, entries: &[IndexedEntry]) -> Result<(), BrowserError>
where
    F: FileSystem + ?Sized,
{
    let path = cache_path(dir);
    if fs.exists(&path) {
        let _ = fs.remove_file(&path);
    }
    let res = fs.open_write(&path).and_then(|mut out| {
        serialize(entries, &mut out)?;
        out.flush()
    });
    match res {
        Ok(()) => Ok(()),
        Err(source) => {
            if fs.exists(&path) {
                let _ = fs.remove_file(&path);
            }
            Err(BrowserError::CacheWrite { path, source })
        }
    }
}

/// Full rescan of `dir`: scan, sort, and overwrite its cache file.
///
/// Storage failures while enumerating degrade to an empty cache; only a
/// failure to write the cache file itself is returned.
pub fn generate<F, const N: usize>(
    fs: &F,
    dir: &Path,
    classifier: &Classifier,
    opts: ScanOptions,
    progress: Option<&mut dyn FnMut(ScanProgress)>,
) -> Result<ScanReport, BrowserError>
where
    F: FileSystem + ?Sized,
{
    #[cfg(feature = "tracing")]
    let started = Instant::now();
    trace_scan_requested(dir);

    let (table, report) = scan::<F, N>(fs, dir, classifier, opts, progress);
    write(fs, dir, &table)?;

    #[cfg(feature = "tracing")]
    trace_scan_completed(dir, &report, started.elapsed().as_millis());
    Ok(report)
}

/// Read the cache file of `dir`.
///
/// Records come back in file order; they are trusted to be sorted already.
pub fn load<F, const N: usize>(fs: &F, dir: &Path, classifier: &Classifier) -> CacheLoad<N>
where
    F: FileSystem + ?Sized,
{
    let path = cache_path(dir);
    if !fs.exists(&path) {
        return CacheLoad::Missing;
    }
    let mut reader = match fs.open_read(&path) {
        Ok(r) => r,
        Err(err) => {
            trace_cache_unreadable(&path, &err);
            return CacheLoad::Missing;
        }
    };

    let mut entries = SlotTable::new();
    let mut skipped = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                trace_cache_unreadable(&path, &err);
                break;
            }
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        let parsed = std::str::from_utf8(&buf)
            .ok()
            .and_then(|line| parse_record(line, classifier));
        match parsed {
            Some(e) => {
                entries.push(e);
            }
            None => skipped += 1,
        }
    }

    trace_cache_loaded(dir, entries.len(), skipped, entries.overflow());
    CacheLoad::Loaded { entries, skipped }
}

#[cfg(feature = "tracing")]
fn trace_scan_requested(dir: &Path) {
    trace!(event = "scan.requested", dir = %dir.display(), "scan requested");
}

#[cfg(not(feature = "tracing"))]
fn trace_scan_requested(_dir: &Path) {}

#[cfg(feature = "tracing")]
fn trace_scan_completed(dir: &Path, report: &ScanReport, duration_ms: u128) {
    debug!(
        event = "scan.completed",
        dir = %dir.display(),
        scanned = report.scanned,
        retained = report.retained,
        dropped = report.dropped,
        unreadable = report.unreadable,
        aborted = report.aborted,
        duration_ms,
        "scan completed"
    );
}

#[cfg(feature = "tracing")]
fn trace_dir_unavailable(dir: &Path, err: &std::io::Error) {
    warn!(
        event = "scan.dir_unavailable",
        dir = %dir.display(),
        error = %err,
        "directory unavailable, indexing it as empty"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_dir_unavailable(_dir: &Path, _err: &std::io::Error) {}

#[cfg(feature = "tracing")]
fn trace_cache_unreadable(path: &Path, err: &std::io::Error) {
    warn!(
        event = "cache.unreadable",
        path = %path.display(),
        error = %err,
        "index cache unreadable"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_cache_unreadable(_path: &Path, _err: &std::io::Error) {}

#[cfg(feature = "tracing")]
fn trace_cache_loaded(dir: &Path, entries: usize, skipped: usize, dropped: usize) {
    trace!(
        event = "cache.loaded",
        dir = %dir.display(),
        entries, skipped, dropped, "index cache loaded"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_cache_loaded(_dir: &Path, _entries: usize, _skipped: usize, _dropped: usize) {}
