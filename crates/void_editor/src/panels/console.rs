//! Console/log panel.
//!
//! Keeps recent log records for display. [`ConsoleLogger`] feeds it from
//! the `log` facade, so warnings raised deep inside the asset core (skipped
//! scenes, failed listings) show up in the editor as well as on stderr.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

/// Severity of a console record, least severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Info => "[INFO]",
            LogLevel::Warning => "[WARN]",
            LogLevel::Error => "[ERROR]",
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}

/// One record shown in the console.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    /// `log` target, usually the module path (`void_asset::index`)
    pub target: String,
    pub message: String,
    /// Time of the latest repeat
    pub last_seen: Instant,
    /// Identical consecutive records folded into this one
    pub repeats: u32,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            target: target.into(),
            message: message.into(),
            last_seen: Instant::now(),
            repeats: 1,
        }
    }

    fn same_record(&self, level: LogLevel, target: &str, message: &str) -> bool {
        self.level == level && self.target == target && self.message == message
    }

    /// Crate that emitted the record
    pub fn source_crate(&self) -> &str {
        self.target.split("::").next().unwrap_or(&self.target)
    }
}

/// What the console currently displays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleFilter {
    pub min_level: LogLevel,
    /// Case-insensitive substring of message or target
    pub text: String,
}

impl Default for ConsoleFilter {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            text: String::new(),
        }
    }
}

impl ConsoleFilter {
    pub fn accepts(&self, entry: &LogEntry) -> bool {
        if entry.level < self.min_level {
            return false;
        }
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        entry.message.to_lowercase().contains(&needle) || entry.target.to_lowercase().contains(&needle)
    }
}

/// Bounded history of log records.
#[derive(Debug)]
pub struct Console {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    pub filter: ConsoleFilter,
}

impl Default for Console {
    fn default() -> Self {
        Self::with_capacity(1000)
    }
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            filter: ConsoleFilter::default(),
        }
    }

    /// Append a record, folding it into the previous one when identical.
    pub fn push(&mut self, level: LogLevel, target: &str, message: impl Into<String>) {
        let message = message.into();

        if let Some(last) = self.entries.back_mut() {
            if last.same_record(level, target, &message) {
                last.repeats += 1;
                last.last_seen = Instant::now();
                return;
            }
        }

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry::new(level, target, message));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &VecDeque<LogEntry> {
        &self.entries
    }

    /// Records passing the current filter, oldest first
    pub fn visible(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| self.filter.accepts(e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Warnings held, counting folded repeats
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.level == LogLevel::Warning)
            .map(|e| e.repeats as usize)
            .sum()
    }
}

/// `log` backend that records into a [`Console`] and forwards to env_logger.
pub struct ConsoleLogger {
    console: Arc<Mutex<Console>>,
    inner: env_logger::Logger,
}

impl ConsoleLogger {
    /// Filter from `RUST_LOG`, defaulting to `info`.
    pub fn new(console: Arc<Mutex<Console>>) -> Self {
        let inner =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).build();
        Self { console, inner }
    }

    /// Use explicit env_logger filters such as `"void_asset=debug"`.
    pub fn with_filter(console: Arc<Mutex<Console>>, filters: &str) -> Self {
        let inner = env_logger::Builder::new().parse_filters(filters).build();
        Self { console, inner }
    }

    /// Install as the global logger.
    pub fn init(self) -> Result<(), log::SetLoggerError> {
        log::set_max_level(self.inner.filter());
        log::set_boxed_logger(Box::new(self))
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.inner.matches(record) {
            return;
        }
        self.console
            .lock()
            .push(record.level().into(), record.target(), record.args().to_string());
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}
