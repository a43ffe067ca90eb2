//! Folder index over the asset root
//!
//! The index owns no cached state besides its configuration. The folder
//! tree is rebuilt wholesale by [`FileIndex::build_tree`] whenever the
//! structure changes, and file listings are produced on demand for the
//! directory the browser currently shows.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::{AssetError, AssetResult};
use crate::fs::{DirEntryInfo, DiskFileSystem, FileSystem};
use crate::kind::AssetKind;
use crate::path::AssetPath;

/// Rules that decide what the index shows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Top-level folder names shown even when they contain nothing
    pub kept_empty_dirs: Vec<String>,
    /// Top-level folders the atlas packer writes page images into
    pub derived_dirs: Vec<String>,
    /// Extensions of packer output inside `derived_dirs`
    pub derived_extensions: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            kept_empty_dirs: vec!["gfx".into(), "scene".into()],
            derived_dirs: vec!["atlas".into()],
            derived_extensions: vec!["png".into(), "jpg".into()],
        }
    }
}

/// A folder below the asset root
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryNode {
    pub path: AssetPath,
    pub parent: Option<AssetPath>,
    pub children: Vec<DirectoryNode>,
}

impl DirectoryNode {
    fn new(path: AssetPath) -> Self {
        let parent = path.parent();
        Self {
            path,
            parent,
            children: Vec::new(),
        }
    }

    /// Folder name, empty for the root
    pub fn name(&self) -> &str {
        self.path.file_name()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Find a folder anywhere in this subtree
    pub fn find(&self, path: &AssetPath) -> Option<&DirectoryNode> {
        if &self.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.path) {
            return None;
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    pub fn contains(&self, path: &AssetPath) -> bool {
        self.find(path).is_some()
    }

    /// Depth-first walk, this node first
    pub fn iter(&self) -> impl Iterator<Item = &DirectoryNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Number of folders in this subtree, including this one
    pub fn len(&self) -> usize {
        self.iter().count()
    }
}

/// A file in a listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    pub path: AssetPath,
    pub kind: AssetKind,
    pub size: Option<u64>,
    pub modified: Option<SystemTime>,
}

impl FileEntry {
    pub fn name(&self) -> &str {
        self.path.file_name()
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension()
    }
}

/// Search filter for file listings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileFilter {
    /// Case-sensitive substring of the file name; empty matches all
    pub search: String,
}

impl FileFilter {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: text.into(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.search.is_empty() || name.contains(&self.search)
    }
}

/// Files of one directory, in the filesystem's listing order.
///
/// The directory is listed once; iterating stats each file lazily and can
/// be restarted any number of times.
pub struct FileListing {
    dir: AssetPath,
    entries: Vec<DirEntryInfo>,
    filter: FileFilter,
    config: IndexConfig,
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FileListing {
    pub fn dir(&self) -> &AssetPath {
        &self.dir
    }

    pub fn filter(&self) -> &FileFilter {
        &self.filter
    }

    pub fn iter(&self) -> impl Iterator<Item = FileEntry> + '_ {
        self.entries
            .iter()
            .filter(|entry| !entry.is_dir && self.filter.matches(&entry.name))
            .filter_map(|entry| self.dir.join(&entry.name).ok())
            .filter(|path| !is_derived(&self.config, path))
            .map(|path| {
                let meta = self.fs.metadata(&path.to_fs_path(&self.root)).ok();
                FileEntry {
                    kind: AssetKind::of(&path),
                    size: meta.map(|m| m.size),
                    modified: meta.and_then(|m| m.modified),
                    path,
                }
            })
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn to_vec(&self) -> Vec<FileEntry> {
        self.iter().collect()
    }
}

impl std::fmt::Debug for FileListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileListing")
            .field("dir", &self.dir)
            .field("entries", &self.entries.len())
            .field("filter", &self.filter)
            .finish()
    }
}

fn is_derived(config: &IndexConfig, path: &AssetPath) -> bool {
    let in_output_dir = match path.first_segment() {
        Some(first) => path.segments().nth(1).is_some() && config.derived_dirs.iter().any(|d| d == first),
        None => false,
    };
    in_output_dir
        && path.extension().map_or(false, |ext| {
            config
                .derived_extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext))
        })
}

/// Index over one asset root
pub struct FileIndex {
    root: PathBuf,
    config: IndexConfig,
    fs: Arc<dyn FileSystem>,
}

impl FileIndex {
    /// Index a folder on disk
    pub fn new(root: impl Into<PathBuf>, config: IndexConfig) -> Self {
        Self::with_file_system(root, config, Arc::new(DiskFileSystem))
    }

    pub fn with_file_system(
        root: impl Into<PathBuf>,
        config: IndexConfig,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            fs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Filesystem location of an asset
    pub fn resolve(&self, path: &AssetPath) -> PathBuf {
        path.to_fs_path(&self.root)
    }

    /// Asset path of a filesystem location inside the root
    pub fn relativize(&self, path: &Path) -> AssetResult<AssetPath> {
        AssetPath::from_fs_path(&self.root, path)
    }

    pub fn exists(&self, path: &AssetPath) -> bool {
        self.fs.exists(&self.resolve(path))
    }

    pub fn is_dir(&self, path: &AssetPath) -> bool {
        self.fs.is_dir(&self.resolve(path))
    }

    /// Folder exists and lists no entries at all
    pub fn is_empty_dir(&self, path: &AssetPath) -> bool {
        matches!(self.fs.list(&self.resolve(path)), Ok(entries) if entries.is_empty())
    }

    /// Whether a file is atlas packer output hidden from listings
    pub fn is_derived(&self, path: &AssetPath) -> bool {
        is_derived(&self.config, path)
    }

    /// Read a whole file
    pub fn read(&self, path: &AssetPath) -> AssetResult<Vec<u8>> {
        let fs_path = self.resolve(path);
        self.fs.read(&fs_path).map_err(|e| AssetError::io(fs_path, e))
    }

    /// Rebuild the folder tree from disk.
    ///
    /// Empty top-level folders are left out unless their name is kept.
    /// Nested folders are always shown. A folder that cannot be listed is
    /// treated as empty; only an unreadable root fails.
    pub fn build_tree(&self) -> AssetResult<DirectoryNode> {
        let entries = self
            .fs
            .list(&self.root)
            .map_err(|e| AssetError::io(&self.root, e))?;

        let mut root = DirectoryNode::new(AssetPath::root());
        self.add_children(&mut root, &entries);

        log::debug!("Built asset tree with {} folders", root.len());
        Ok(root)
    }

    fn add_children(&self, node: &mut DirectoryNode, entries: &[DirEntryInfo]) {
        for entry in entries.iter().filter(|e| e.is_dir) {
            let path = match node.path.join(&entry.name) {
                Ok(path) => path,
                Err(e) => {
                    log::debug!("Skipping folder {:?}: {}", entry.name, e);
                    continue;
                }
            };

            let fs_path = self.resolve(&path);
            let child_entries = match self.fs.list(&fs_path) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Failed to list '{}': {}", fs_path.display(), e);
                    Vec::new()
                }
            };

            if node.is_root() && child_entries.is_empty() && !self.is_kept_empty(&entry.name) {
                continue;
            }

            let mut child = DirectoryNode::new(path);
            self.add_children(&mut child, &child_entries);
            node.children.push(child);
        }
    }

    fn is_kept_empty(&self, name: &str) -> bool {
        self.config.kept_empty_dirs.iter().any(|kept| kept == name)
    }

    /// List the files of one directory
    pub fn list_files(&self, dir: &AssetPath, filter: &FileFilter) -> AssetResult<FileListing> {
        let fs_path = self.resolve(dir);
        let entries = self
            .fs
            .list(&fs_path)
            .map_err(|e| AssetError::io(fs_path, e))?;

        Ok(FileListing {
            dir: dir.clone(),
            entries,
            filter: filter.clone(),
            config: self.config.clone(),
            root: self.root.clone(),
            fs: Arc::clone(&self.fs),
        })
    }

    /// Every file below the root that satisfies `predicate`
    pub fn walk_files<F>(&self, mut predicate: F) -> AssetResult<Vec<AssetPath>>
    where
        F: FnMut(&AssetPath) -> bool,
    {
        let root_entries = self
            .fs
            .list(&self.root)
            .map_err(|e| AssetError::io(&self.root, e))?;

        let mut files = Vec::new();
        let mut pending = vec![(AssetPath::root(), root_entries)];

        while let Some((dir, entries)) = pending.pop() {
            for entry in entries {
                let path = match dir.join(&entry.name) {
                    Ok(path) => path,
                    Err(_) => continue,
                };

                if !entry.is_dir {
                    if predicate(&path) {
                        files.push(path);
                    }
                    continue;
                }

                let fs_path = self.resolve(&path);
                match self.fs.list(&fs_path) {
                    Ok(children) => pending.push((path, children)),
                    Err(e) => log::warn!("Skipping '{}': {}", fs_path.display(), e),
                }
            }
        }

        Ok(files)
    }

    /// Remove a file, or a folder recursively
    pub fn remove(&self, path: &AssetPath) -> AssetResult<()> {
        if path.is_root() {
            return Err(AssetError::InvalidPath {
                path: String::new(),
                reason: "the asset root cannot be removed",
            });
        }

        let fs_path = self.resolve(path);
        self.fs
            .remove(&fs_path)
            .map_err(|e| AssetError::io(fs_path, e))?;

        log::info!("Removed asset '{}'", path);
        Ok(())
    }
}

impl std::fmt::Debug for FileIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileIndex")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish()
    }
}
