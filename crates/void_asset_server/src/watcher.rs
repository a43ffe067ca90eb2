//! File system watcher for the asset root
//!
//! The notify backend runs on its own thread and only pushes raw events
//! into a channel. [`FileWatcher::poll`] runs on the owner thread, turns
//! raw events into [`WatchEvent`]s and dispatches them to subscribers on
//! that thread.
//!
//! A `Removed` event is only reported once the path is really gone.
//! Backends report removals that are still in flight (and renames as
//! plain modifications), so removals that arrive while the path still
//! exists are parked and re-checked on every poll.
//!
//! `Changed` is debounced per path. A change inside the window is held
//! back and delivered by the first poll after the window ends, so the
//! last write of a burst is never lost.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "file-watcher")]
use notify::{Event, EventKind, RecursiveMode, Watcher};

use void_asset::{AssetError, AssetPath, AssetResult, DiskFileSystem, FileSystem};

use crate::subscription::{Listeners, Subscription};

/// Default debounce window for change events
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// A raw file change event as reported by the backend
#[derive(Debug, Clone)]
pub struct FileChange {
    /// Path to the changed file
    pub path: PathBuf,
    /// Type of change
    pub kind: FileChangeKind,
}

/// Type of raw file change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeKind {
    /// File was created
    Created,
    /// File was modified or renamed
    Modified,
    /// File was deleted
    Deleted,
}

/// Normalized event delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WatchEvent {
    /// Created or modified. May arrive before a delete completes
    Changed(AssetPath),
    /// Gone from disk at the time of delivery
    Removed(AssetPath),
}

impl WatchEvent {
    pub fn path(&self) -> &AssetPath {
        match self {
            WatchEvent::Changed(path) | WatchEvent::Removed(path) => path,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, WatchEvent::Removed(_))
    }
}

/// Turns raw backend changes into [`WatchEvent`]s
pub struct ChangeNormalizer {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    /// Last `Changed` delivery per path
    debounce: HashMap<AssetPath, Instant>,
    debounce_duration: Duration,
    /// Removals reported while the path still existed
    parked: BTreeSet<AssetPath>,
    /// Changes suppressed inside the debounce window
    pending: BTreeSet<AssetPath>,
}

impl ChangeNormalizer {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            fs,
            debounce: HashMap::new(),
            debounce_duration: DEFAULT_DEBOUNCE,
            parked: BTreeSet::new(),
            pending: BTreeSet::new(),
        }
    }

    pub fn set_debounce(&mut self, duration: Duration) {
        self.debounce_duration = duration;
    }

    pub fn debounce(&self) -> Duration {
        self.debounce_duration
    }

    /// Removals waiting for their path to disappear
    pub fn parked(&self) -> impl Iterator<Item = &AssetPath> {
        self.parked.iter()
    }

    /// Changes held back until their debounce window ends
    pub fn pending(&self) -> impl Iterator<Item = &AssetPath> {
        self.pending.iter()
    }

    fn exists(&self, path: &AssetPath) -> bool {
        self.fs.exists(&path.to_fs_path(&self.root))
    }

    /// Normalize one batch of raw changes observed at `now`.
    ///
    /// Parked removals and held-back changes are re-checked after the
    /// batch, so both are reported by the first call after the path is
    /// gone or the debounce window has passed, even when `changes` is
    /// empty.
    pub fn normalize<I>(&mut self, changes: I, now: Instant) -> Vec<WatchEvent>
    where
        I: IntoIterator<Item = FileChange>,
    {
        let mut events = Vec::new();

        for change in changes {
            let path = match AssetPath::from_fs_path(&self.root, &change.path) {
                Ok(path) if !path.is_root() => path,
                Ok(_) => continue,
                Err(e) => {
                    log::debug!("Dropping watch event for {:?}: {}", change.path, e);
                    continue;
                }
            };

            match change.kind {
                FileChangeKind::Created | FileChangeKind::Modified => {
                    if !self.exists(&path) {
                        // renamed away, or removed before we looked
                        self.report_removal(path, &mut events);
                        continue;
                    }

                    if self.parked.remove(&path) {
                        log::debug!("Discarding parked removal of recreated '{}'", path);
                    }

                    if !self.window_passed(&path, now) {
                        self.pending.insert(path);
                        continue;
                    }
                    self.pending.remove(&path);
                    self.debounce.insert(path.clone(), now);
                    events.push(WatchEvent::Changed(path));
                }
                FileChangeKind::Deleted => {
                    if self.exists(&path) {
                        log::debug!("Parking removal of '{}' until it is gone", path);
                        self.parked.insert(path);
                    } else {
                        self.report_removal(path, &mut events);
                    }
                }
            }
        }

        let gone: Vec<AssetPath> = self
            .parked
            .iter()
            .filter(|path| !self.exists(path))
            .cloned()
            .collect();
        for path in gone {
            self.report_removal(path, &mut events);
        }

        let due: Vec<AssetPath> = self
            .pending
            .iter()
            .filter(|path| self.window_passed(path, now))
            .cloned()
            .collect();
        for path in due {
            self.pending.remove(&path);
            if !self.exists(&path) {
                log::debug!("Dropping held-back change of vanished '{}'", path);
                continue;
            }
            self.debounce.insert(path.clone(), now);
            events.push(WatchEvent::Changed(path));
        }

        // Clean up old debounce entries
        let horizon = self.debounce_duration.max(Duration::from_secs(5));
        self.debounce
            .retain(|_, time| now.duration_since(*time) < horizon);

        events
    }

    fn window_passed(&self, path: &AssetPath, now: Instant) -> bool {
        self.debounce
            .get(path)
            .map_or(true, |last| now.duration_since(*last) >= self.debounce_duration)
    }

    fn report_removal(&mut self, path: AssetPath, events: &mut Vec<WatchEvent>) {
        self.parked.remove(&path);
        self.pending.remove(&path);
        self.debounce.remove(&path);

        let event = WatchEvent::Removed(path);
        if !events.contains(&event) {
            events.push(event);
        }
    }
}

/// Watches the asset root and notifies subscribers
pub struct FileWatcher {
    #[cfg(feature = "file-watcher")]
    _watcher: notify::RecommendedWatcher,
    #[cfg(feature = "file-watcher")]
    rx: crossbeam_channel::Receiver<notify::Result<Event>>,

    root: PathBuf,
    normalizer: ChangeNormalizer,
    listeners: Listeners<WatchEvent>,
}

impl FileWatcher {
    /// Start watching `root` recursively
    #[cfg(feature = "file-watcher")]
    pub fn new(root: impl Into<PathBuf>) -> AssetResult<Self> {
        let root = root.into();
        // backends report resolved paths
        let root = std::fs::canonicalize(&root).unwrap_or(root);
        let (tx, rx) = crossbeam_channel::unbounded();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })
        .map_err(|e| AssetError::Watch(format!("Failed to create file watcher: {}", e)))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| AssetError::Watch(format!("Failed to watch {:?}: {}", root, e)))?;

        log::info!("Watching asset root: {:?}", root);
        Ok(Self {
            _watcher: watcher,
            rx,
            normalizer: ChangeNormalizer::new(root.clone(), Arc::new(DiskFileSystem)),
            root,
            listeners: Listeners::new(),
        })
    }

    /// Create a watcher that never reports (no-op without file-watcher feature)
    #[cfg(not(feature = "file-watcher"))]
    pub fn new(root: impl Into<PathBuf>) -> AssetResult<Self> {
        let root = root.into();
        Ok(Self {
            normalizer: ChangeNormalizer::new(root.clone(), Arc::new(DiskFileSystem)),
            root,
            listeners: Listeners::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register a callback for normalized events
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&WatchEvent) + Send + 'static,
    {
        self.listeners.subscribe(callback)
    }

    /// Set debounce duration
    pub fn set_debounce(&mut self, duration: Duration) {
        self.normalizer.set_debounce(duration);
    }

    /// Drain the backend, notify subscribers and return what was delivered.
    ///
    /// Call regularly, e.g. once per frame: held-back changes are only
    /// released by a later poll.
    pub fn poll(&mut self) -> Vec<WatchEvent> {
        let changes = self.drain();
        let events = self.normalizer.normalize(changes, Instant::now());

        for event in &events {
            log::debug!("Asset watch event: {:?}", event);
            self.listeners.emit(event);
        }
        events
    }

    #[cfg(feature = "file-watcher")]
    fn drain(&mut self) -> Vec<FileChange> {
        let mut changes = Vec::new();

        // Drain all pending events
        while let Ok(result) = self.rx.try_recv() {
            let event = match result {
                Ok(event) => event,
                Err(e) => {
                    log::warn!("File watcher error: {}", e);
                    continue;
                }
            };

            let kind = match event.kind {
                EventKind::Create(_) => FileChangeKind::Created,
                EventKind::Modify(_) => FileChangeKind::Modified,
                EventKind::Remove(_) => FileChangeKind::Deleted,
                _ => continue,
            };

            changes.extend(event.paths.into_iter().map(|path| FileChange { path, kind }));
        }

        changes
    }

    #[cfg(not(feature = "file-watcher"))]
    fn drain(&mut self) -> Vec<FileChange> {
        Vec::new()
    }
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("root", &self.root)
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}
