//! # void_asset - Project Asset Model
//!
//! The editor-side view of a project's asset folder:
//! - Normalized, root-relative [`AssetPath`]s
//! - A closed [`AssetKind`] table deciding what can be opened or analyzed
//! - A [`FileIndex`] that builds the folder tree and per-folder listings
//! - A [`DocumentCache`] holding at most one open document per path
//!
//! ## Example
//!
//! ```ignore
//! use void_asset::prelude::*;
//!
//! let index = FileIndex::new("project/assets", IndexConfig::default());
//! let tree = index.build_tree()?;
//!
//! for entry in index.list_files(&AssetPath::new("gfx")?, &FileFilter::default())?.iter() {
//!     println!("{} ({})", entry.path, entry.kind.name());
//! }
//! ```

pub mod cache;
pub mod error;
pub mod fs;
pub mod handle;
pub mod index;
pub mod kind;
pub mod path;

pub use cache::DocumentCache;
pub use error::{AssetError, AssetResult, ErrorKind};
pub use fs::{DirEntryInfo, DiskFileSystem, FileMeta, FileSystem};
pub use handle::{DocumentHandle, DocumentId};
pub use index::{DirectoryNode, FileEntry, FileFilter, FileIndex, FileListing, IndexConfig};
pub use kind::{AssetKind, KindTraits};
pub use path::AssetPath;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::cache::DocumentCache;
    pub use crate::error::{AssetError, AssetResult, ErrorKind};
    pub use crate::handle::DocumentHandle;
    pub use crate::index::{DirectoryNode, FileEntry, FileFilter, FileIndex, IndexConfig};
    pub use crate::kind::AssetKind;
    pub use crate::path::AssetPath;
}
