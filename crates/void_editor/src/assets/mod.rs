//! Asset operations behind the browser.
//!
//! Document opening, usage analysis, the delete workflow and drag payloads.

mod delete;
mod documents;
mod drag;
mod usage;

pub use delete::{DeleteDecision, DeleteOutcome, DeletePrompt, DeleteWorkflow};
pub use documents::{load_document, opener_for, OpenDocument, OpenDocumentHandle, Opener};
pub use drag::{DragPayload, DragSource};
pub use usage::{AssetUsage, AssetsUsages, ScanWarning, UsageAnalyzer, UsageLocation};
