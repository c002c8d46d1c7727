use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

use crate::browser_events::{BrowserEvent, Transition};
use crate::browser_state::{BrowserState, Phase};
use crate::classify::Classifier;
use crate::core::{BrowserConfig, BrowserError, DEFAULT_CAPACITY};
use crate::entry::{ActionTrigger, Entry};
use crate::fs::FileSystem;
use crate::index_cache::{self, CacheLoad, ScanOptions, ScanProgress, ScanReport};
use crate::last_visited;
use crate::sandbox::Sandbox;
use crate::slots::SlotTable;

impl From<&BrowserConfig> for ScanOptions {
    fn from(cfg: &BrowserConfig) -> Self {
        Self {
            overflow: cfg.overflow,
            progress_interval: cfg.progress_interval,
        }
    }
}

/// Build a listing: synthetic entries first, then the cached entries.
///
/// The result always holds at least the rescan trigger, plus the parent
/// marker when `at_root` is false.
pub fn build_listing<const N: usize>(at_root: bool, load: CacheLoad<N>) -> SlotTable<Entry, N> {
    let mut listing = SlotTable::new();
    if !at_root {
        listing.push(Entry::Action(ActionTrigger::ParentDirectory));
    }
    listing.push(Entry::Action(ActionTrigger::Rescan));
    if let CacheLoad::Loaded { mut entries, .. } = load {
        for e in entries.drain() {
            if !listing.push(Entry::from(e)) {
                break;
            }
        }
    }
    listing
}

/// Directory browser confined to a sandbox root.
///
/// Owns the current directory and a listing of at most `N` entries. Driven
/// one [`BrowserEvent`] at a time; every storage access is a blocking call on
/// the caller's thread.
///
/// Examples
/// ```no_run
/// use rom_browser::{Browser, BrowserConfig, BrowserEvent, StdFileSystem, Transition};
///
/// let mut browser: Browser<_> =
///     Browser::open(StdFileSystem, BrowserConfig::new("/sd/roms")).unwrap();
/// browser.apply_event(BrowserEvent::Select(1));
/// if let Transition::Launch(path) = browser.apply_event(BrowserEvent::Activate) {
///     eprintln!("launching {}", path.display());
/// }
/// ```
pub struct Browser<F: FileSystem, const N: usize = DEFAULT_CAPACITY> {
    fs: F,
    config: BrowserConfig,
    classifier: Classifier,
    sandbox: Sandbox,
    state: BrowserState<N>,
    progress: Option<Box<dyn FnMut(ScanProgress)>>,
}

impl<F: FileSystem, const N: usize> Browser<F, N> {
    /// Open the browser at the last visited directory (or the root).
    ///
    /// Creates the sandbox root when missing. Failing to provide the root is
    /// the only error; everything else degrades to empty listings.
    pub fn open(fs: F, config: BrowserConfig) -> Result<Self, BrowserError> {
        let sandbox = Sandbox::new(config.root.clone());
        ensure_root(&fs, &sandbox)?;

        let cwd = last_visited::load(&fs, &sandbox);
        let classifier = Classifier::new(&config.extensions);
        let mut browser = Self {
            fs,
            config,
            classifier,
            sandbox,
            state: BrowserState::new(cwd),
            progress: None,
        };
        browser.reload(false);
        browser.persist_pointer();
        trace_opened(&browser.state.cwd, browser.state.listing.len());
        Ok(browser)
    }

    /// Install a callback receiving coarse scan progress.
    pub fn set_progress_callback(&mut self, cb: impl FnMut(ScanProgress) + 'static) {
        self.progress = Some(Box::new(cb));
    }

    /// Current directory
    pub fn cwd(&self) -> &Path {
        &self.state.cwd
    }

    /// Sandbox root
    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    /// Whether the current directory is the sandbox root.
    pub fn is_at_root(&self) -> bool {
        self.sandbox.is_root(&self.state.cwd)
    }

    /// Current listing
    pub fn listing(&self) -> &[Entry] {
        &self.state.listing
    }

    /// Selected index
    pub fn selected(&self) -> usize {
        self.state.selected
    }

    /// Selected entry
    pub fn selected_entry(&self) -> Option<&Entry> {
        self.state.listing.get(self.state.selected)
    }

    /// Path picked for launch, once the browser reached its terminal phase.
    pub fn launch_path(&self) -> Option<&Path> {
        match &self.state.phase {
            Phase::Launch(p) => Some(p),
            Phase::Browsing => None,
        }
    }

    /// Report of the most recent scan this session.
    pub fn last_scan(&self) -> Option<&ScanReport> {
        self.state.last_scan.as_ref()
    }

    /// Cache records skipped by the most recent load.
    pub fn skipped_records(&self) -> usize {
        self.state.skipped_records
    }

    /// Configuration in use
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Apply one navigation event.
    ///
    /// Once a launchable entry was picked every further event is ignored.
    pub fn apply_event(&mut self, ev: BrowserEvent) -> Transition {
        if self.launch_path().is_some() {
            return Transition::Ignored;
        }
        match ev {
            BrowserEvent::Select(i) => {
                if i < self.state.listing.len() {
                    self.state.selected = i;
                    Transition::SelectionMoved
                } else {
                    Transition::Ignored
                }
            }
            BrowserEvent::MoveSelection(delta) => {
                let len = self.state.listing.len() as isize;
                if len == 0 || delta == 0 {
                    return Transition::Ignored;
                }
                // Reduce first so `selected + delta` cannot overflow.
                let next = (self.state.selected as isize + delta.rem_euclid(len)).rem_euclid(len);
                self.state.selected = next as usize;
                Transition::SelectionMoved
            }
            BrowserEvent::Activate => self.activate(self.state.selected),
            BrowserEvent::NavigateUp => match self.state.position_of(ActionTrigger::ParentDirectory) {
                Some(i) => self.activate(i),
                None => Transition::Ignored,
            },
            BrowserEvent::Rescan => match self.state.position_of(ActionTrigger::Rescan) {
                Some(i) => self.activate(i),
                None => Transition::Ignored,
            },
        }
    }

    fn activate(&mut self, index: usize) -> Transition {
        let Some(entry) = self.state.listing.get(index).cloned() else {
            return Transition::Ignored;
        };
        self.state.selected = index;
        match entry {
            Entry::Action(ActionTrigger::Rescan) => {
                self.rescan();
                Transition::Rescanned
            }
            Entry::Action(ActionTrigger::ParentDirectory) => {
                let parent = self.sandbox.parent_of(&self.state.cwd);
                self.change_dir(parent);
                Transition::DirectoryChanged
            }
            Entry::Directory(name) => {
                let next = self.sandbox.child_of(&self.state.cwd, &name);
                self.change_dir(next);
                Transition::DirectoryChanged
            }
            Entry::Launchable(name) => match self.sandbox.try_child(&self.state.cwd, &name) {
                Some(path) => {
                    trace_launch(&path);
                    self.state.phase = Phase::Launch(path.clone());
                    Transition::Launch(path)
                }
                None => Transition::Ignored,
            },
        }
    }

    fn rescan(&mut self) {
        self.generate();
        self.reload(false);
        self.state.selected = self.state.first_real_index().unwrap_or(0);
    }

    fn change_dir(&mut self, dir: PathBuf) {
        let mut dir = self.sandbox.confine(dir);
        if !self.fs.is_dir(&dir) {
            trace_dir_missing(&dir);
            dir = self.sandbox.root().to_path_buf();
        }
        trace_dir_changed(&self.state.cwd, &dir);
        self.state.cwd = dir;
        self.reload(self.config.generate_on_miss);
        self.persist_pointer();
        self.state.selected = 0;
    }

    fn generate(&mut self) {
        let opts = ScanOptions::from(&self.config);
        let progress = self
            .progress
            .as_mut()
            .map(|cb| &mut **cb as &mut dyn FnMut(ScanProgress));
        let res = index_cache::generate::<F, N>(
            &self.fs,
            &self.state.cwd,
            &self.classifier,
            opts,
            progress,
        );
        match res {
            Ok(report) => self.state.last_scan = Some(report),
            Err(err) => trace_storage_failure("generate", &err),
        }
    }

    fn reload(&mut self, generate_on_miss: bool) {
        let mut load = index_cache::load::<F, N>(&self.fs, &self.state.cwd, &self.classifier);
        if !load.is_found() && generate_on_miss {
            self.generate();
            load = index_cache::load::<F, N>(&self.fs, &self.state.cwd, &self.classifier);
        }
        self.state.skipped_records = match &load {
            CacheLoad::Loaded { skipped, .. } => *skipped,
            CacheLoad::Missing => 0,
        };
        let at_root = self.is_at_root();
        self.state.listing = build_listing(at_root, load);
        if self.state.selected >= self.state.listing.len() {
            self.state.selected = 0;
        }
    }

    fn persist_pointer(&self) {
        if let Err(err) = last_visited::save(&self.fs, &self.sandbox, &self.state.cwd) {
            trace_storage_failure("save last visited", &BrowserError::Io(err));
        }
    }
}

fn ensure_root<F: FileSystem + ?Sized>(fs: &F, sandbox: &Sandbox) -> Result<(), BrowserError> {
    let root = sandbox.root();
    if fs.is_dir(root) {
        return Ok(());
    }
    if fs.exists(root) {
        return Err(BrowserError::SandboxNotDirectory(root.to_path_buf()));
    }
    fs.create_dir_all(root)
        .map_err(|source| BrowserError::SandboxUnavailable {
            root: root.to_path_buf(),
            source,
        })
}

#[cfg(feature = "tracing")]
fn trace_opened(cwd: &Path, entries: usize) {
    info!(
        event = "browser.opened",
        cwd = %cwd.display(),
        entries, "browser opened"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_opened(_cwd: &Path, _entries: usize) {}

#[cfg(feature = "tracing")]
fn trace_dir_changed(from: &Path, to: &Path) {
    debug!(
        event = "browser.dir_changed",
        from = %from.display(),
        to = %to.display(),
        "directory changed"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_dir_changed(_from: &Path, _to: &Path) {}

#[cfg(feature = "tracing")]
fn trace_dir_missing(dir: &Path) {
    warn!(
        event = "browser.dir_missing",
        dir = %dir.display(),
        "directory no longer exists, returning to root"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_dir_missing(_dir: &Path) {}

#[cfg(feature = "tracing")]
fn trace_launch(path: &Path) {
    info!(event = "browser.launch", path = %path.display(), "launch selected");
}

#[cfg(not(feature = "tracing"))]
fn trace_launch(_path: &Path) {}

#[cfg(feature = "tracing")]
fn trace_storage_failure(op: &'static str, err: &BrowserError) {
    warn!(event = "storage.failure", op, error = %err, "storage operation failed, continuing");
}

#[cfg(not(feature = "tracing"))]
fn trace_storage_failure(_op: &'static str, _err: &BrowserError) {}
