//! Persisted pointer to the last browsed directory.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::core::LAST_VISITED_FILE_NAME;
use crate::fs::FileSystem;
use crate::sandbox::Sandbox;

/// Location of the pointer file for a sandbox.
pub fn pointer_path(sandbox: &Sandbox) -> PathBuf {
    sandbox.root().join(LAST_VISITED_FILE_NAME)
}

/// Last visited directory, or the root when the record is missing, unreadable,
/// outside the sandbox, or no longer an existing directory.
pub fn load<F: FileSystem + ?Sized>(fs: &F, sandbox: &Sandbox) -> PathBuf {
    let path = pointer_path(sandbox);
    if !fs.exists(&path) {
        return sandbox.root().to_path_buf();
    }
    let mut raw = String::new();
    let read = fs
        .open_read(&path)
        .and_then(|mut r| r.read_to_string(&mut raw));
    if let Err(err) = read {
        trace_pointer_unreadable(&path, &err);
        return sandbox.root().to_path_buf();
    }

    let candidate = PathBuf::from(raw.trim());
    if sandbox.contains(&candidate) && fs.is_dir(&candidate) {
        candidate
    } else {
        trace_pointer_rejected(&candidate);
        sandbox.root().to_path_buf()
    }
}

/// Overwrite the pointer with `dir`.
pub fn save<F: FileSystem + ?Sized>(fs: &F, sandbox: &Sandbox, dir: &Path) -> std::io::Result<()> {
    if !fs.is_dir(sandbox.root()) {
        fs.create_dir_all(sandbox.root())?;
    }
    let mut out = fs.open_write(&pointer_path(sandbox))?;
    out.write_all(dir.to_string_lossy().as_bytes())?;
    out.flush()
}

#[cfg(feature = "tracing")]
fn trace_pointer_unreadable(path: &Path, err: &std::io::Error) {
    warn!(
        event = "pointer.unreadable",
        path = %path.display(),
        error = %err,
        "last visited pointer unreadable, starting at root"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_pointer_unreadable(_path: &Path, _err: &std::io::Error) {}

#[cfg(feature = "tracing")]
fn trace_pointer_rejected(candidate: &Path) {
    debug!(
        event = "pointer.rejected",
        candidate = %candidate.display(),
        "last visited directory no longer valid, starting at root"
    );
}

#[cfg(not(feature = "tracing"))]
fn trace_pointer_rejected(_candidate: &Path) {}
