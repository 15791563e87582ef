//! Filesystem primitives used by the deletion engine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Kind of a directory entry, as reported without following links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Symlink,
    /// Sockets, FIFOs, device nodes.
    Other,
}

impl EntryKind {
    /// Classify a file type without following symbolic links.
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// A listed directory entry.
#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// The operations the engine performs on the filesystem.
///
/// Implementations must be shareable across worker threads.
pub trait Filesystem: Send + Sync {
    /// List a directory without following symbolic links.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Give the owner full access to a directory.
    fn make_dir_writable(&self, path: &Path) -> io::Result<()>;

    /// Give the owner read/write access to a file.
    fn make_file_writable(&self, path: &Path) -> io::Result<()>;

    /// Remove a file or symbolic link.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;
}

/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        fs::read_dir(path)?
            .map(|entry| -> io::Result<DirEntryInfo> {
                let entry = entry?;
                Ok(DirEntryInfo {
                    path: entry.path(),
                    kind: EntryKind::from_file_type(entry.file_type()?),
                })
            })
            .collect()
    }

    fn make_dir_writable(&self, path: &Path) -> io::Result<()> {
        set_mode(path, 0o700)
    }

    fn make_file_writable(&self, path: &Path) -> io::Result<()> {
        set_mode(path, 0o600)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, _mode: u32) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}
