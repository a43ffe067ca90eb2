//! Open document cache
//!
//! Maps an asset path to at most one live [`DocumentHandle`]. Repeated
//! opens of the same path return the same handle until it is invalidated
//! or closed.

use std::collections::BTreeMap;

use crate::error::{AssetError, AssetResult};
use crate::handle::{DocumentHandle, DocumentId};
use crate::path::AssetPath;

/// Cache of open documents, keyed by path
pub struct DocumentCache<T> {
    handles: BTreeMap<AssetPath, DocumentHandle<T>>,
    next_id: u64,
}

impl<T> DocumentCache<T> {
    pub fn new() -> Self {
        Self {
            handles: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Return the live handle for `path`, loading it on first use.
    ///
    /// A failing loader registers nothing and its error is returned as is.
    pub fn open<F>(&mut self, path: &AssetPath, loader: F) -> AssetResult<DocumentHandle<T>>
    where
        F: FnOnce(&AssetPath) -> AssetResult<T>,
    {
        if let Some(handle) = self.handles.get(path) {
            return Ok(handle.clone());
        }

        let document = loader(path)?;
        self.register(path.clone(), document)
    }

    /// Register a document that was loaded elsewhere
    pub fn register(&mut self, path: AssetPath, document: T) -> AssetResult<DocumentHandle<T>> {
        if self.handles.contains_key(&path) {
            debug_assert!(false, "second live handle for '{}'", path);
            return Err(AssetError::StateInvariant(format!(
                "a document is already open for '{}'",
                path
            )));
        }

        let id = self.allocate_id();
        let handle = DocumentHandle::new(id, path.clone(), document);
        log::debug!("Opened document '{}' ({:?})", path, id);
        self.handles.insert(path, handle.clone());
        Ok(handle)
    }

    /// Live handle for `path`, if any
    pub fn get(&self, path: &AssetPath) -> Option<&DocumentHandle<T>> {
        self.handles.get(path)
    }

    pub fn is_open(&self, path: &AssetPath) -> bool {
        self.handles.contains_key(path)
    }

    /// Drop and release the handle for `path`; returns whether one existed
    pub fn invalidate(&mut self, path: &AssetPath) -> bool {
        match self.handles.remove(path) {
            Some(handle) => {
                handle.release();
                log::debug!("Invalidated document '{}'", path);
                true
            }
            None => false,
        }
    }

    /// Release every document at or below `dir`, returning their paths
    pub fn invalidate_under(&mut self, dir: &AssetPath) -> Vec<AssetPath> {
        let doomed: Vec<AssetPath> = self
            .handles
            .keys()
            .filter(|path| path.starts_with(dir))
            .cloned()
            .collect();

        for path in &doomed {
            self.invalidate(path);
        }
        doomed
    }

    /// Release a document by handle, e.g. when its tab was closed.
    ///
    /// Stale handles that no longer match the live one are ignored.
    pub fn close(&mut self, handle: &DocumentHandle<T>) -> bool {
        let live = matches!(self.handles.get(handle.path()), Some(h) if h.ptr_eq(handle));
        if live {
            self.invalidate(handle.path())
        } else {
            false
        }
    }

    /// Open paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &AssetPath> {
        self.handles.keys()
    }

    pub fn handles(&self) -> impl Iterator<Item = &DocumentHandle<T>> {
        self.handles.values()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Release everything
    pub fn clear(&mut self) {
        for handle in self.handles.values() {
            handle.release();
        }
        self.handles.clear();
    }
}

impl<T> Default for DocumentCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for DocumentCache<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn path(s: &str) -> AssetPath {
        AssetPath::new(s).unwrap()
    }

    #[test]
    fn test_open_reuses_handle() {
        let mut cache = DocumentCache::new();
        let calls = Cell::new(0);
        let load = |p: &AssetPath| {
            calls.set(calls.get() + 1);
            Ok(p.to_string())
        };

        let a = cache.open(&path("atlas/ui.atlas"), load).unwrap();
        let b = cache.open(&path("atlas/ui.atlas"), load).unwrap();

        assert!(a.ptr_eq(&b));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_load_registers_nothing() {
        let mut cache: DocumentCache<String> = DocumentCache::new();
        let p = path("scene/broken.scene");

        let result = cache.open(&p, |p| Err(AssetError::corrupt(p, "bad json")));
        assert!(matches!(result, Err(AssetError::CorruptFormat { .. })));
        assert!(!cache.is_open(&p));
    }

    #[test]
    fn test_invalidate_releases() {
        let mut cache = DocumentCache::new();
        let p = path("atlas/ui.atlas");
        let handle = cache.open(&p, |_| Ok(1)).unwrap();

        assert!(cache.invalidate(&p));
        assert!(handle.is_released());
        assert!(!cache.invalidate(&p));

        let reopened = cache.open(&p, |_| Ok(2)).unwrap();
        assert!(!reopened.ptr_eq(&handle));
        assert_eq!(*reopened, 2);
    }

    #[test]
    fn test_invalidate_under_folder() {
        let mut cache = DocumentCache::new();
        cache.open(&path("scene/a.scene"), |_| Ok(())).unwrap();
        cache.open(&path("scene/sub/b.scene"), |_| Ok(())).unwrap();
        cache.open(&path("scenes/c.scene"), |_| Ok(())).unwrap();

        let released = cache.invalidate_under(&path("scene"));
        assert_eq!(released, vec![path("scene/a.scene"), path("scene/sub/b.scene")]);
        assert!(cache.is_open(&path("scenes/c.scene")));
    }

    #[test]
    fn test_close_ignores_stale_handle() {
        let mut cache = DocumentCache::new();
        let p = path("atlas/ui.atlas");
        let stale = cache.open(&p, |_| Ok(1)).unwrap();
        cache.invalidate(&p);
        let live = cache.open(&p, |_| Ok(2)).unwrap();

        assert!(!cache.close(&stale));
        assert!(cache.is_open(&p));
        assert!(cache.close(&live));
        assert!(cache.is_empty());
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_duplicate_register_is_error() {
        let mut cache = DocumentCache::new();
        cache.register(path("a.atlas"), 1).unwrap();
        assert!(matches!(
            cache.register(path("a.atlas"), 2),
            Err(AssetError::StateInvariant(_))
        ));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "second live handle")]
    fn test_duplicate_register_panics_in_debug() {
        let mut cache = DocumentCache::new();
        cache.register(path("a.atlas"), 1).unwrap();
        let _ = cache.register(path("a.atlas"), 2);
    }
}
