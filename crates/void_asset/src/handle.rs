//! Document Handle - Reference to an open document
//!
//! Handles are cheap clones of one shared allocation. Two handles are the
//! same document when they point at the same allocation, which is what
//! [`DocumentHandle::ptr_eq`] checks. Once the cache drops a document the
//! handle is marked released, so UI surfaces holding a stale clone can
//! notice and close.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::path::AssetPath;

/// Unique identifier for an open document
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub u64);

impl DocumentId {
    pub const fn id(&self) -> u64 {
        self.0
    }
}

struct HandleData<T> {
    id: DocumentId,
    path: AssetPath,
    document: T,
    released: AtomicBool,
}

/// Shared handle to an open document
pub struct DocumentHandle<T> {
    data: Arc<HandleData<T>>,
}

impl<T> DocumentHandle<T> {
    pub(crate) fn new(id: DocumentId, path: AssetPath, document: T) -> Self {
        Self {
            data: Arc::new(HandleData {
                id,
                path,
                document,
                released: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.data.id
    }

    /// Path the document was opened from
    pub fn path(&self) -> &AssetPath {
        &self.data.path
    }

    pub fn document(&self) -> &T {
        &self.data.document
    }

    /// The cache no longer tracks this document
    pub fn is_released(&self) -> bool {
        self.data.released.load(Ordering::Acquire)
    }

    pub(crate) fn release(&self) {
        self.data.released.store(true, Ordering::Release);
    }

    /// Whether both handles refer to the same open document
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Number of live clones, including this one
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.data)
    }
}

impl<T> Clone for DocumentHandle<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T> Deref for DocumentHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data.document
    }
}

impl<T> PartialEq for DocumentHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for DocumentHandle<T> {}

impl<T> fmt::Debug for DocumentHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("id", &self.data.id)
            .field("path", &self.data.path)
            .field("released", &self.is_released())
            .finish()
    }
}
