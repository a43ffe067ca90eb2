//! Editor panels.
//!
//! Panel state and behaviour without widgets; the UI layer renders them.

mod asset_browser;
mod console;

pub use asset_browser::{AssetBrowser, AssetsView};
pub use console::{Console, ConsoleFilter, ConsoleLogger, LogEntry, LogLevel};
