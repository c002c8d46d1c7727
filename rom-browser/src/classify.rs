//! Noise filter and launchable detection.

use std::path::Path;

use crate::core::INDEX_FILE_NAME;
use crate::entry::IndexedKind;

/// Volume label folder created by some hosts on FAT media.
pub const SYSTEM_VOLUME_LABEL: &str = "System Volume Information";

/// Prefix of resource-fork artifacts left by macOS.
pub const RESOURCE_FORK_PREFIX: &str = "._";

/// Classification of one storage object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Navigable directory
    Directory,
    /// Launchable program image
    Launchable,
    /// Noise or unsupported file
    Reject,
}

impl Classification {
    /// Kind of the accepted entry, `None` when rejected.
    pub fn kind(self) -> Option<IndexedKind> {
        match self {
            Classification::Directory => Some(IndexedKind::Directory),
            Classification::Launchable => Some(IndexedKind::Launchable),
            Classification::Reject => None,
        }
    }
}

/// Whether `name` is noise that never shows up in a listing.
///
/// Names that cannot be written back as a single cache record (empty, path
/// separators, line breaks) count as noise too.
pub fn is_noise(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\n', '\r']) {
        return true;
    }
    if name.eq_ignore_ascii_case(SYSTEM_VOLUME_LABEL) {
        return true;
    }
    if name.starts_with(RESOURCE_FORK_PREFIX) {
        return true;
    }
    name == INDEX_FILE_NAME
}

/// Entry classifier.
///
/// Pure: the result only depends on the name, the directory flag and the
/// configured extensions, so a live scan and a cache load agree on every name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classifier {
    extensions: Vec<String>,
}

impl Classifier {
    /// Create a classifier accepting files with one of `extensions`.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|s| s.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Classify a storage object by base name and directory flag.
    pub fn classify(&self, name: &str, is_dir: bool) -> Classification {
        if is_noise(name) {
            return Classification::Reject;
        }
        if is_dir {
            return Classification::Directory;
        }
        if self.is_launchable(name) {
            Classification::Launchable
        } else {
            Classification::Reject
        }
    }

    fn is_launchable(&self, name: &str) -> bool {
        let ext = Path::new(name)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());
        match ext {
            Some(e) => self.extensions.iter().any(|x| x == &e),
            None => false,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(["gb", "gbc"])
    }
}
