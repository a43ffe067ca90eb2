//! Filesystem access used by the index and the delete workflow
//!
//! Kept behind a trait so the editor can run against an in-memory or
//! failing filesystem in tests.

use std::io;
use std::path::Path;
use std::time::SystemTime;

/// One entry of a directory listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

/// Metadata of a single file
#[derive(Clone, Copy, Debug)]
pub struct FileMeta {
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Filesystem operations the asset core depends on
pub trait FileSystem: Send + Sync {
    /// List a directory in the platform's native order
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Read a whole file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Remove a file, or a folder with everything below it
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Stat a path
    fn metadata(&self, path: &Path) -> io::Result<FileMeta>;

    fn exists(&self, path: &Path) -> bool {
        self.metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.metadata(path).map(|m| m.is_dir).unwrap_or(false)
    }
}

/// The real disk
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    log::debug!("Skipping non UTF-8 file name {:?} in {:?}", raw, dir);
                    continue;
                }
            };
            let is_dir = entry.file_type()?.is_dir();
            entries.push(DirEntryInfo { name, is_dir });
        }

        Ok(entries)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        if std::fs::symlink_metadata(path)?.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
    }

    fn metadata(&self, path: &Path) -> io::Result<FileMeta> {
        let metadata = std::fs::metadata(path)?;
        Ok(FileMeta {
            is_dir: metadata.is_dir(),
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified: metadata.modified().ok(),
        })
    }
}
