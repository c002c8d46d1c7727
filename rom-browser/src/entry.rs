//! Listing entries.

/// Label of the parent-directory marker.
pub const PARENT_LABEL: &str = "..";

/// Label of the rescan trigger.
pub const RESCAN_LABEL: &str = "[ UPDATE ROM LIST ]";

/// Kind of an entry backed by a storage object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexedKind {
    /// Navigable directory
    Directory,
    /// Launchable program image
    Launchable,
}

impl IndexedKind {
    pub(crate) fn as_tag(self) -> char {
        match self {
            IndexedKind::Directory => 'D',
            IndexedKind::Launchable => 'F',
        }
    }

    pub(crate) fn from_tag(ch: char) -> Option<Self> {
        match ch {
            'D' => Some(IndexedKind::Directory),
            'F' => Some(IndexedKind::Launchable),
            _ => None,
        }
    }
}

/// An accepted storage object, as stored in the index cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedEntry {
    /// Entry kind
    pub kind: IndexedKind,
    /// Base name, never empty and never noise
    pub name: String,
}

impl IndexedEntry {
    /// Directory entry
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            kind: IndexedKind::Directory,
            name: name.into(),
        }
    }

    /// Launchable entry
    pub fn launchable(name: impl Into<String>) -> Self {
        Self {
            kind: IndexedKind::Launchable,
            name: name.into(),
        }
    }

    /// Whether this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == IndexedKind::Directory
    }
}

/// Synthetic listing entries that are not backed by storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionTrigger {
    /// Go to the parent directory; present everywhere except at the root.
    ParentDirectory,
    /// Regenerate the index cache of the current directory.
    Rescan,
}

/// One row of a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    /// Directory inside the current one
    Directory(String),
    /// Launchable program image
    Launchable(String),
    /// Synthetic entry
    Action(ActionTrigger),
}

impl Entry {
    /// Storage name for real entries, `None` for synthetic ones.
    pub fn name(&self) -> Option<&str> {
        match self {
            Entry::Directory(n) | Entry::Launchable(n) => Some(n),
            Entry::Action(_) => None,
        }
    }

    /// Whether this entry is synthetic.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Entry::Action(_))
    }

    /// Text shown for this entry in a listing.
    pub fn label(&self) -> String {
        match self {
            Entry::Directory(n) => format!("[ {n} ]"),
            Entry::Launchable(n) => n.clone(),
            Entry::Action(ActionTrigger::ParentDirectory) => PARENT_LABEL.to_string(),
            Entry::Action(ActionTrigger::Rescan) => RESCAN_LABEL.to_string(),
        }
    }
}

impl From<IndexedEntry> for Entry {
    fn from(e: IndexedEntry) -> Self {
        match e.kind {
            IndexedKind::Directory => Entry::Directory(e.name),
            IndexedKind::Launchable => Entry::Launchable(e.name),
        }
    }
}
