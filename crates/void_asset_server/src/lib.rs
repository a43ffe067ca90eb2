//! # Void Asset Server
//!
//! Keeps the editor's view of the asset folder in sync with the disk.
//!
//! ## Features
//!
//! - **File Watching**: Recursive watch of the asset root with debounced,
//!   normalized change and removal events
//! - **Subscriptions**: Listener objects that unregister when dropped
//! - **Loaders**: JSON scenes and libGDX texture atlases
//!
//! ## Example
//!
//! ```ignore
//! use void_asset_server::{FileWatcher, WatchEvent};
//!
//! let mut watcher = FileWatcher::new("project/assets")?;
//! let _subscription = watcher.subscribe(|event| match event {
//!     WatchEvent::Changed(path) => println!("Changed: {}", path),
//!     WatchEvent::Removed(path) => println!("Removed: {}", path),
//! });
//!
//! // In the editor loop:
//! watcher.poll();
//! ```

pub mod loaders;
pub mod subscription;
pub mod watcher;

pub use loaders::{
    AtlasDocument, AtlasLoader, AtlasPage, AtlasRegion,
    ComponentDef, EntityDef, SceneDocument, SceneLoader, SceneReference, TransformDef,
};

pub use subscription::{Listeners, Subscription};
pub use watcher::{ChangeNormalizer, FileChange, FileChangeKind, FileWatcher, WatchEvent, DEFAULT_DEBOUNCE};
