use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Directory entry yielded by [`FileSystem::read_dir`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsEntry {
    /// Base name (no parent path)
    pub name: String,
    /// Whether this entry is a directory.
    pub is_dir: bool,
}

/// Streaming directory enumeration.
pub type DirIter<'a> = Box<dyn Iterator<Item = std::io::Result<FsEntry>> + 'a>;

/// Storage abstraction over the removable volume.
///
/// Every call may fail; failures come back as `Err`, never as a panic. The
/// medium is assumed slow and single-threaded, so callers drive one operation
/// at a time.
pub trait FileSystem {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;
    /// Whether `path` exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;
    /// Enumerate the entries of a directory one by one.
    fn read_dir(&self, dir: &Path) -> std::io::Result<DirIter<'_>>;
    /// Open a file for buffered reading.
    fn open_read(&self, path: &Path) -> std::io::Result<Box<dyn BufRead + '_>>;
    /// Create or truncate a file and open it for writing.
    fn open_write(&self, path: &Path) -> std::io::Result<Box<dyn Write + '_>>;
    /// Remove a file.
    fn remove_file(&self, path: &Path) -> std::io::Result<()>;
    /// Create a directory and any missing parents.
    fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn read_dir(&self, dir: &Path) -> std::io::Result<DirIter<'_>> {
        (**self).read_dir(dir)
    }

    fn open_read(&self, path: &Path) -> std::io::Result<Box<dyn BufRead + '_>> {
        (**self).open_read(path)
    }

    fn open_write(&self, path: &Path) -> std::io::Result<Box<dyn Write + '_>> {
        (**self).open_write(path)
    }

    fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        (**self).remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        (**self).create_dir_all(path)
    }
}

/// Default filesystem implementation using `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
    }

    fn read_dir(&self, dir: &Path) -> std::io::Result<DirIter<'_>> {
        let rd = std::fs::read_dir(dir)?;
        Ok(Box::new(rd.map(|e| {
            let e = e?;
            let ft = e.file_type()?;
            // Follow links so a linked folder browses like a folder.
            let is_dir = if ft.is_symlink() {
                std::fs::metadata(e.path()).map(|m| m.is_dir()).unwrap_or(false)
            } else {
                ft.is_dir()
            };
            Ok(FsEntry {
                name: e.file_name().to_string_lossy().to_string(),
                is_dir,
            })
        })))
    }

    fn open_read(&self, path: &Path) -> std::io::Result<Box<dyn BufRead + '_>> {
        let f = std::fs::File::open(path)?;
        Ok(Box::new(BufReader::new(f)))
    }

    fn open_write(&self, path: &Path) -> std::io::Result<Box<dyn Write + '_>> {
        let f = std::fs::File::create(path)?;
        Ok(Box::new(BufWriter::new(f)))
    }

    fn remove_file(&self, path: &Path) -> std::io::Result<()> {
        std::fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(path)
    }
}
