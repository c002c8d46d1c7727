use std::path::PathBuf;

use crate::entry::{ActionTrigger, Entry};
use crate::index_cache::ScanReport;
use crate::slots::SlotTable;

/// Browser phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Navigating listings
    Browsing,
    /// Terminal: a launchable entry was picked
    Launch(PathBuf),
}

/// State owned by the browser.
///
/// This is intentionally independent of any rendering types to keep the core
/// testable.
#[derive(Clone, Debug)]
pub struct BrowserState<const N: usize> {
    /// Current directory, always inside the sandbox
    pub(crate) cwd: PathBuf,
    /// Synthetic entries first, then cached entries in stored order
    pub(crate) listing: SlotTable<Entry, N>,
    /// Selected listing index
    pub(crate) selected: usize,
    pub(crate) phase: Phase,
    /// Report of the most recent scan, if any ran this session
    pub(crate) last_scan: Option<ScanReport>,
    /// Cache records skipped by the most recent load
    pub(crate) skipped_records: usize,
}

impl<const N: usize> BrowserState<N> {
    pub(crate) fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            listing: SlotTable::new(),
            selected: 0,
            phase: Phase::Browsing,
            last_scan: None,
            skipped_records: 0,
        }
    }

    pub(crate) fn position_of(&self, action: ActionTrigger) -> Option<usize> {
        self.listing
            .iter()
            .position(|e| *e == Entry::Action(action))
    }

    /// Index of the first storage-backed entry.
    pub(crate) fn first_real_index(&self) -> Option<usize> {
        self.listing.iter().position(|e| !e.is_synthetic())
    }
}
