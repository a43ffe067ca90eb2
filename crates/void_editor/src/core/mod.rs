//! Core editor types shared by the panels.

mod preferences;

pub use preferences::{BrowserPreferences, PreferencesError, WatcherSettings};
