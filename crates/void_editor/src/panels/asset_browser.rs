//! Asset browser panel.
//!
//! The core of the asset browser without any widgets. The UI layer calls
//! into [`AssetBrowser`] and is called back through [`AssetsView`]. All
//! state lives on the thread that owns the browser; watcher events reach
//! it through [`AssetBrowser::pump`].

use std::sync::Arc;

use void_asset::{
    AssetError, AssetKind, AssetPath, AssetResult, DirectoryNode, DocumentCache, ErrorKind,
    FileEntry, FileFilter, FileIndex,
};
use void_asset_server::{FileWatcher, WatchEvent};

use crate::assets::{
    load_document, AssetsUsages, DeleteDecision, DeleteOutcome, DeletePrompt, DeleteWorkflow,
    DragSource, OpenDocument, OpenDocumentHandle, UsageAnalyzer,
};

/// Callbacks from the browser core to the UI.
pub trait AssetsView {
    /// The folder tree was rebuilt
    fn on_tree_changed(&mut self, tree: &DirectoryNode);

    /// The listing of the displayed folder changed
    fn on_file_list_changed(&mut self, dir: &AssetPath, entries: &[FileEntry]);

    /// A safe delete or usage search found references
    fn on_usages_found(&mut self, usages: &AssetsUsages);

    fn on_error(&mut self, kind: ErrorKind, message: &str);
}

/// Asset browser state.
pub struct AssetBrowser<V> {
    index: Arc<FileIndex>,
    analyzer: UsageAnalyzer,
    deletes: DeleteWorkflow,
    documents: DocumentCache<OpenDocument>,
    view: V,

    tree: Option<DirectoryNode>,
    current_dir: Option<AssetPath>,
    search: String,
    entries: Vec<FileEntry>,
}

impl<V: AssetsView> AssetBrowser<V> {
    pub fn new(index: Arc<FileIndex>, view: V) -> Self {
        let analyzer = UsageAnalyzer::new(Arc::clone(&index));
        let deletes = DeleteWorkflow::new(Arc::clone(&index), analyzer.clone());
        Self {
            index,
            analyzer,
            deletes,
            documents: DocumentCache::new(),
            view,
            tree: None,
            current_dir: None,
            search: String::new(),
            entries: Vec::new(),
        }
    }

    /// Forward a failure to the view and hand it back.
    fn report<T>(&mut self, result: AssetResult<T>) -> AssetResult<T> {
        if let Err(e) = &result {
            log::error!("Asset browser: {}", e);
            self.view.on_error(e.kind(), &e.to_string());
        }
        result
    }

    // ------------------------------------------------------------------
    // Tree and listing
    // ------------------------------------------------------------------

    /// Rebuild the folder tree.
    ///
    /// If the displayed folder no longer exists the browser moves to its
    /// closest surviving ancestor.
    pub fn refresh_tree(&mut self) -> AssetResult<()> {
        self.rebuild_tree().map(|_| ())
    }

    /// Returns whether the displayed folder was re-listed.
    fn rebuild_tree(&mut self) -> AssetResult<bool> {
        let result = self.index.build_tree();
        let tree = self.report(result)?;
        self.view.on_tree_changed(&tree);
        self.tree = Some(tree);

        let Some(dir) = self.current_dir.clone() else {
            return Ok(false);
        };
        if self.index.is_dir(&dir) {
            return Ok(false);
        }

        let mut fallback = dir.parent().unwrap_or_else(AssetPath::root);
        while !fallback.is_root() && !self.index.is_dir(&fallback) {
            fallback = fallback.parent().unwrap_or_else(AssetPath::root);
        }
        log::info!("'{}' disappeared, showing '{}'", dir, fallback);
        self.current_dir = Some(fallback);
        self.search.clear();
        self.refresh_current_directory()?;
        Ok(true)
    }

    /// Re-list the displayed folder with the current search.
    pub fn refresh_current_directory(&mut self) -> AssetResult<()> {
        let Some(dir) = self.current_dir.clone() else {
            return Ok(());
        };

        let result = self.index.list_files(&dir, &FileFilter::search(self.search.clone()));
        let entries = self.report(result)?.to_vec();
        self.show(dir, entries);
        Ok(())
    }

    fn show(&mut self, dir: AssetPath, entries: Vec<FileEntry>) {
        self.entries = entries;
        self.view.on_file_list_changed(&dir, &self.entries);
        self.current_dir = Some(dir);
    }

    /// Display another folder. Clears the search.
    ///
    /// On failure the previous folder stays displayed.
    pub fn change_directory(&mut self, dir: &AssetPath) -> AssetResult<()> {
        let result = self.index.list_files(dir, &FileFilter::default());
        let entries = self.report(result)?.to_vec();
        self.search.clear();
        self.show(dir.clone(), entries);
        Ok(())
    }

    /// Display the parent of the current folder.
    pub fn navigate_up(&mut self) -> AssetResult<()> {
        match self.current_dir.as_ref().and_then(|dir| dir.parent()) {
            Some(parent) => self.change_directory(&parent),
            None => Ok(()),
        }
    }

    /// Filter the displayed folder by file name.
    ///
    /// Returns `false` when a folder is displayed and nothing matches a
    /// non-empty search, so the UI can flag the search field.
    pub fn set_search(&mut self, text: impl Into<String>) -> bool {
        self.search = text.into();
        if self.current_dir.is_none() {
            return true;
        }

        if self.refresh_current_directory().is_err() {
            return true;
        }
        self.search.is_empty() || !self.entries.is_empty()
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Open a scene or atlas, reusing the live document if there is one.
    pub fn request_open(&mut self, path: &AssetPath) -> AssetResult<OpenDocumentHandle> {
        if !AssetKind::of(path).is_openable() {
            return self.report(Err(AssetError::NotOpenable(path.clone())));
        }

        // deleted behind our back and no event seen yet
        if self.documents.is_open(path) && !self.index.exists(path) {
            self.documents.invalidate(path);
        }

        let index = Arc::clone(&self.index);
        let result = self.documents.open(path, |p| load_document(&index, p));
        self.report(result)
    }

    /// Close the document shown for `path`. Returns whether one was open.
    pub fn close_document(&mut self, path: &AssetPath) -> bool {
        self.documents.invalidate(path)
    }

    /// Close by handle; stale handles are ignored.
    pub fn close_handle(&mut self, handle: &OpenDocumentHandle) -> bool {
        self.documents.close(handle)
    }

    pub fn documents(&self) -> &DocumentCache<OpenDocument> {
        &self.documents
    }

    // ------------------------------------------------------------------
    // Usages and delete
    // ------------------------------------------------------------------

    /// Run a usage search and show the result.
    pub fn find_usages(&mut self, path: &AssetPath) -> AssetResult<AssetsUsages> {
        let result = self.analyzer.analyze(path);
        let usages = self.report(result)?;
        self.view.on_usages_found(&usages);
        Ok(usages)
    }

    /// Start a delete; the UI shows a dialog for the returned prompt.
    pub fn request_delete(&mut self, path: &AssetPath) -> AssetResult<DeletePrompt> {
        let result = self.deletes.start(path);
        self.report(result)
    }

    /// Finish a delete with the user's decision.
    pub fn resolve_delete(
        &mut self,
        prompt: DeletePrompt,
        decision: DeleteDecision,
    ) -> AssetResult<DeleteOutcome> {
        let result = self.deletes.resolve(prompt, decision);
        let outcome = self.report(result)?;

        match &outcome {
            DeleteOutcome::Deleted(path) => {
                // the watcher will report this too, later
                self.handle_watch_event(&WatchEvent::Removed(path.clone()));
            }
            DeleteOutcome::UsagesFound(usages) => self.view.on_usages_found(usages),
            DeleteOutcome::Cancelled(_) => {}
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Filesystem sync
    // ------------------------------------------------------------------

    /// Apply one watcher event.
    pub fn handle_watch_event(&mut self, event: &WatchEvent) {
        self.handle_watch_events(std::slice::from_ref(event));
    }

    /// Apply a batch of watcher events with at most one refresh.
    pub fn handle_watch_events(&mut self, events: &[WatchEvent]) {
        let mut structural = false;
        let mut listing = false;

        for event in events {
            match event {
                WatchEvent::Removed(path) => {
                    self.documents.invalidate_under(path);
                }
                WatchEvent::Changed(path) => {
                    self.documents.invalidate(path);
                }
            }

            if self.is_structural(event) {
                structural = true;
            } else if self.current_dir.is_some() && event.path().parent() == self.current_dir {
                listing = true;
            }
        }

        // failures already reached the view
        if structural {
            if let Ok(false) = self.rebuild_tree() {
                let _ = self.refresh_current_directory();
            }
        } else if listing {
            let _ = self.refresh_current_directory();
        }
    }

    /// Whether an event changes the folder tree.
    fn is_structural(&self, event: &WatchEvent) -> bool {
        let path = event.path();
        let Some(tree) = &self.tree else {
            return true;
        };

        if tree.contains(path) || self.index.is_dir(path) {
            return true;
        }

        let Some(parent) = path.parent() else {
            return true;
        };
        if !tree.contains(&parent) {
            return true;
        }

        // only empty top-level folders drop out of the tree
        let top_level = parent.parent().is_some_and(|p| p.is_root());
        event.is_removal() && top_level && self.index.is_empty_dir(&parent)
    }

    /// Drain the watcher and apply its events. Returns the event count.
    pub fn pump(&mut self, watcher: &mut FileWatcher) -> usize {
        let events = watcher.poll();
        if !events.is_empty() {
            self.handle_watch_events(&events);
        }
        events.len()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Draggable files of the listing, then the regions of open atlases.
    pub fn drag_sources(&self) -> Vec<DragSource> {
        let mut sources: Vec<DragSource> = self
            .entries
            .iter()
            .filter_map(|entry| DragSource::for_file(&entry.path))
            .collect();

        for handle in self.documents.handles() {
            if let Some(atlas) = handle.as_atlas() {
                sources.extend(DragSource::for_atlas(handle.path(), atlas));
            }
        }
        sources
    }

    pub fn analyzer(&self) -> &UsageAnalyzer {
        &self.analyzer
    }

    pub fn index(&self) -> &Arc<FileIndex> {
        &self.index
    }

    pub fn tree(&self) -> Option<&DirectoryNode> {
        self.tree.as_ref()
    }

    pub fn current_dir(&self) -> Option<&AssetPath> {
        self.current_dir.as_ref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}
