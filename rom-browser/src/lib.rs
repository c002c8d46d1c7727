#![deny(missing_docs)]
//! Sandboxed ROM directory browser for handheld firmware front ends.
//!
//! The browser walks a directory tree below a fixed root, lists only
//! sub-directories and program images, and keeps a small index cache file in
//! every directory it has scanned so re-entering a large directory is a
//! sequential read instead of a full enumeration.
//!
//! Pieces:
//! - [`Browser`]: the navigation state machine driven by [`BrowserEvent`]s
//! - [`index_cache`]: scan, sort, write and read per-directory caches
//! - [`last_visited`]: the persisted pointer to the last browsed directory
//! - [`FileSystem`]: the storage seam; [`StdFileSystem`] wraps `std::fs`

mod browser_core;
mod browser_events;
mod browser_state;
mod classify;
mod core;
mod entry;
mod fs;
pub mod index_cache;
pub mod last_visited;
pub mod logging;
mod order;
mod sandbox;
mod slots;

pub use browser_core::{Browser, build_listing};
pub use browser_events::{BrowserEvent, Transition};
pub use browser_state::Phase;
pub use classify::{Classification, Classifier, is_noise};
pub use core::{
    BrowserConfig, BrowserError, DEFAULT_CAPACITY, DEFAULT_PROGRESS_INTERVAL, DEFAULT_ROOT,
    INDEX_FILE_NAME, LAST_VISITED_FILE_NAME, OverflowPolicy,
};
pub use entry::{ActionTrigger, Entry, IndexedEntry, IndexedKind, PARENT_LABEL, RESCAN_LABEL};
pub use fs::{DirIter, FileSystem, FsEntry, StdFileSystem};
pub use index_cache::{CacheLoad, ScanOptions, ScanProgress, ScanReport};
pub use order::{cmp_names, compare, sort_entries};
pub use sandbox::Sandbox;
pub use slots::SlotTable;
