//! Delete workflow with optional usage check.
//!
//! ```text
//! start(path) -> DeletePrompt ── user picks ──> resolve(prompt, decision)
//!                                                 Cancel            -> Cancelled
//!                                                 DeleteDirectly    -> remove -> Deleted
//!                                                 SafeDeleteChecked -> analyze
//!                                                     0 usages      -> remove -> Deleted
//!                                                     n usages      -> UsagesFound
//! ```
//!
//! A prompt holds a per-path guard until it is resolved or dropped, so two
//! prompts for the same path cannot be in flight at once. Nothing stops a
//! scene from gaining a reference between the usage scan and the removal.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use void_asset::{AssetError, AssetPath, AssetResult, FileIndex};

use super::usage::{AssetsUsages, UsageAnalyzer};

/// What the user chose in the delete dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteDecision {
    Cancel,
    DeleteDirectly,
    SafeDeleteChecked,
}

/// Terminal state of a delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled(AssetPath),
    Deleted(AssetPath),
    /// The asset is still referenced and was left in place
    UsagesFound(AssetsUsages),
}

type InFlight = Arc<Mutex<HashSet<AssetPath>>>;

struct DeleteGuard {
    path: AssetPath,
    in_flight: InFlight,
}

impl Drop for DeleteGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.path);
    }
}

/// A started delete waiting for the user's decision.
pub struct DeletePrompt {
    path: AssetPath,
    can_safe_delete: bool,
    _guard: DeleteGuard,
}

impl DeletePrompt {
    pub fn path(&self) -> &AssetPath {
        &self.path
    }

    /// Whether the dialog may offer safe delete.
    pub fn can_safe_delete(&self) -> bool {
        self.can_safe_delete
    }
}

impl std::fmt::Debug for DeletePrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeletePrompt")
            .field("path", &self.path)
            .field("can_safe_delete", &self.can_safe_delete)
            .finish()
    }
}

/// Orchestrates user-facing deletes.
#[derive(Clone)]
pub struct DeleteWorkflow {
    index: Arc<FileIndex>,
    analyzer: UsageAnalyzer,
    in_flight: InFlight,
}

impl DeleteWorkflow {
    pub fn new(index: Arc<FileIndex>, analyzer: UsageAnalyzer) -> Self {
        Self {
            index,
            analyzer,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Begin deleting `path`.
    pub fn start(&self, path: &AssetPath) -> AssetResult<DeletePrompt> {
        if path.is_root() {
            return Err(AssetError::InvalidPath {
                path: String::new(),
                reason: "the asset root cannot be deleted",
            });
        }

        if !self.in_flight.lock().insert(path.clone()) {
            return Err(AssetError::DeleteInProgress(path.clone()));
        }
        let guard = DeleteGuard {
            path: path.clone(),
            in_flight: Arc::clone(&self.in_flight),
        };

        Ok(DeletePrompt {
            path: path.clone(),
            can_safe_delete: self.analyzer.can_analyze(path),
            _guard: guard,
        })
    }

    /// Apply the user's decision. The prompt is consumed either way.
    ///
    /// A removal failure leaves the file in place and is returned as is.
    pub fn resolve(&self, prompt: DeletePrompt, decision: DeleteDecision) -> AssetResult<DeleteOutcome> {
        let path = prompt.path.clone();

        match decision {
            DeleteDecision::Cancel => Ok(DeleteOutcome::Cancelled(path)),
            DeleteDecision::DeleteDirectly => self.remove(path),
            DeleteDecision::SafeDeleteChecked if !prompt.can_safe_delete => {
                log::debug!("'{}' cannot be analyzed, deleting directly", path);
                self.remove(path)
            }
            DeleteDecision::SafeDeleteChecked => {
                let usages = self.analyzer.analyze(&path)?;
                if usages.is_empty() {
                    self.remove(path)
                } else {
                    log::info!("Not deleting '{}': {}", path, usages);
                    Ok(DeleteOutcome::UsagesFound(usages))
                }
            }
        }
    }

    fn remove(&self, path: AssetPath) -> AssetResult<DeleteOutcome> {
        self.index.remove(&path)?;
        Ok(DeleteOutcome::Deleted(path))
    }

    /// Whether a prompt for `path` is outstanding
    pub fn is_in_progress(&self, path: &AssetPath) -> bool {
        self.in_flight.lock().contains(path)
    }
}

impl std::fmt::Debug for DeleteWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteWorkflow")
            .field("in_flight", &self.in_flight.lock().len())
            .finish()
    }
}
