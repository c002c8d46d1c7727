use std::path::PathBuf;
use thiserror::Error;

/// Maximum entries per directory listing, synthetic entries included.
pub const DEFAULT_CAPACITY: usize = 400;

/// Default sandbox root.
pub const DEFAULT_ROOT: &str = "/roms";

/// Reserved name of the per-directory index cache file.
pub const INDEX_FILE_NAME: &str = ".roms.idx";

/// Reserved name of the last-visited pointer file, stored under the root.
pub const LAST_VISITED_FILE_NAME: &str = "last_pos.txt";

/// Default number of scanned objects between two progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 50;

/// What a scan does once the scratch table is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverflowPolicy {
    /// Stop retaining entries but keep enumerating so the scanned total is accurate.
    #[default]
    KeepCounting,
    /// Stop enumerating as soon as one entry had to be dropped.
    StopScan,
}

/// Browser configuration.
///
/// Examples
/// ```
/// use rom_browser::{BrowserConfig, OverflowPolicy};
/// let cfg = BrowserConfig::new("/sd/roms")
///     .extensions(["gb", "gbc", "sgb"])
///     .overflow(OverflowPolicy::StopScan)
///     .progress_interval(25);
/// assert!(cfg.generate_on_miss);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BrowserConfig {
    /// Sandbox root; every path the browser reads, writes or returns lives below it.
    pub root: PathBuf,
    /// Lower-case program-image extensions without dot (e.g. "gb").
    pub extensions: Vec<String>,
    /// Run a full scan when entering a directory that has no index cache yet.
    pub generate_on_miss: bool,
    /// Scratch-table overflow behavior during a scan.
    pub overflow: OverflowPolicy,
    /// Scanned objects between two progress callbacks (0 disables progress).
    pub progress_interval: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            extensions: vec!["gb".into(), "gbc".into()],
            generate_on_miss: true,
            overflow: OverflowPolicy::KeepCounting,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl BrowserConfig {
    /// Create a configuration rooted at `root` with default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Set the sandbox root
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Replace the accepted program-image extensions.
    ///
    /// Extensions are compared case-insensitively; a leading dot is ignored.
    pub fn extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = exts
            .into_iter()
            .map(|s| s.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    /// Scan directories without a cache when entering them
    pub fn generate_on_miss(mut self, yes: bool) -> Self {
        self.generate_on_miss = yes;
        self
    }

    /// Choose the overflow policy
    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.overflow = policy;
        self
    }

    /// Scanned objects between progress callbacks
    pub fn progress_interval(mut self, every: usize) -> Self {
        self.progress_interval = every;
        self
    }
}

/// Errors returned by the browser.
///
/// Storage failures while browsing degrade to empty results; only the cases
/// below reach the caller.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// The sandbox root does not exist and could not be created
    #[error("sandbox root {root:?} unavailable: {source}")]
    SandboxUnavailable {
        /// Configured root
        root: PathBuf,
        /// Underlying storage error
        source: std::io::Error,
    },
    /// The sandbox root exists but is not a directory
    #[error("sandbox root {0:?} is not a directory")]
    SandboxNotDirectory(PathBuf),
    /// Writing an index cache file failed
    #[error("failed to write index cache {path:?}: {source}")]
    CacheWrite {
        /// Cache file path
        path: PathBuf,
        /// Underlying storage error
        source: std::io::Error,
    },
    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
