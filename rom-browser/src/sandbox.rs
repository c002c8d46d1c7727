//! Path arithmetic confined to the sandbox root.
//!
//! Checks are lexical: a path is inside the sandbox when it starts with the
//! root and every component after the root is a plain name.

use std::path::{Component, Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::warn;

/// The sandbox all navigation is confined to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Create a sandbox rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Sandbox root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` is the root itself.
    pub fn is_root(&self, path: &Path) -> bool {
        path == self.root
    }

    /// Whether `path` is the root or a lexical descendant of it.
    pub fn contains(&self, path: &Path) -> bool {
        match path.strip_prefix(&self.root) {
            Ok(rest) => rest.components().all(|c| matches!(c, Component::Normal(_))),
            Err(_) => false,
        }
    }

    /// `path` if it is inside the sandbox, the root otherwise.
    pub fn confine(&self, path: PathBuf) -> PathBuf {
        if self.contains(&path) {
            path
        } else {
            warn_clamped(&path, "outside sandbox");
            self.root.clone()
        }
    }

    /// Immediate parent of `path`, clamped to the root.
    pub fn parent_of(&self, path: &Path) -> PathBuf {
        if self.is_root(path) {
            return self.root.clone();
        }
        match path.parent() {
            Some(p) => self.confine(p.to_path_buf()),
            None => self.root.clone(),
        }
    }

    /// `dir/name` when `name` is one plain path component and the result
    /// stays inside the sandbox.
    ///
    /// A storage object literally named `..` is an ordinary name here and can
    /// never lead above `dir`.
    pub fn try_child(&self, dir: &Path, name: &str) -> Option<PathBuf> {
        let mut comps = Path::new(name).components();
        let plain = matches!(
            (comps.next(), comps.next()),
            (Some(Component::Normal(n)), None) if n == name
        );
        let path = dir.join(name);
        (plain && self.contains(&path)).then_some(path)
    }

    /// `dir/name`, clamped to the root when [`Sandbox::try_child`] refuses it.
    pub fn child_of(&self, dir: &Path, name: &str) -> PathBuf {
        match self.try_child(dir, name) {
            Some(p) => p,
            None => {
                warn_clamped(&dir.join(name), "child escapes sandbox");
                self.root.clone()
            }
        }
    }
}

#[cfg(feature = "tracing")]
fn warn_clamped(path: &Path, reason: &'static str) {
    warn!(
        event = "sandbox.clamped",
        path = %path.display(),
        reason,
        "path clamped to sandbox root"
    );
}

#[cfg(not(feature = "tracing"))]
fn warn_clamped(_path: &Path, _reason: &'static str) {}
