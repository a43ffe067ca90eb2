//! Void Engine Editor - Asset Browser Core
//!
//! The asset management side of the scene editor.
//!
//! ## Features
//!
//! - **Asset Browser**: Folder tree and file listing kept in sync with disk
//! - **Open Documents**: One live document per scene or atlas
//! - **Usage Analysis**: Find every scene reference to an asset
//! - **Safe Delete**: Refuse to delete assets that scenes still use
//! - **Console**: Log sink that surfaces skipped scenes and I/O failures
//!
//! ## Architecture
//!
//! ```text
//! FileWatcher → AssetBrowser::pump → FileIndex refresh → AssetsView
//! AssetsView  → request_open       → DocumentCache
//! AssetsView  → request_delete     → DeleteWorkflow → UsageAnalyzer → remove
//! ```
//!
//! Everything runs on the thread that owns the [`AssetBrowser`].

pub mod assets;
pub mod core;
pub mod panels;

// Re-export commonly used types
pub use assets::{
    AssetUsage,
    AssetsUsages,
    DeleteDecision,
    DeleteOutcome,
    DeletePrompt,
    DeleteWorkflow,
    DragPayload,
    DragSource,
    OpenDocument,
    OpenDocumentHandle,
    ScanWarning,
    UsageAnalyzer,
    UsageLocation,
};

pub use core::{BrowserPreferences, PreferencesError, WatcherSettings};

pub use panels::{
    AssetBrowser,
    AssetsView,
    Console,
    ConsoleFilter,
    ConsoleLogger,
    LogEntry,
    LogLevel,
};
