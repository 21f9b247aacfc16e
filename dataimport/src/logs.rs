//! Import run logging.
//!
//! Every entry is printed to stderr (stdout may carry exported records) and
//! broadcast to subscribers, so a host application can follow a run live.
//!
//! The minimum printed level is read once from `DATAIMPORT_LOG_LEVEL`
//! (`info`, `success`, `warning`, `error` or `off`).

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Environment variable holding the minimum printed level.
pub const LOG_LEVEL_ENV: &str = "DATAIMPORT_LOG_LEVEL";

/// Log level, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Parse a level name. `off` and unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "success" => Some(Self::Success),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth for display
    #[serde(default)]
    pub indent: u8,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    fn with_level(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Error, message)
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Console rendering of the entry.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "  ",
            LogLevel::Success => "✓",
            LogLevel::Warning => "!",
            LogLevel::Error => "✗",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!(
            "{} {}{} {}",
            self.timestamp.format("%H:%M:%S"),
            indent,
            prefix,
            self.message
        )
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::from_env);

/// Prints log entries and broadcasts them to all subscribers
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
    min_level: Option<LogLevel>,
}

impl LogBroadcaster {
    /// `min_level: None` silences the console; subscribers still receive everything.
    pub fn new(min_level: Option<LogLevel>) -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender, min_level }
    }

    pub fn from_env() -> Self {
        let min_level = match std::env::var(LOG_LEVEL_ENV) {
            Ok(name) => LogLevel::parse(&name),
            Err(_) => Some(LogLevel::Info),
        };
        Self::new(min_level)
    }

    /// Print and broadcast an entry.
    pub fn log(&self, entry: LogEntry) {
        if self.min_level.is_some_and(|min| entry.level >= min) {
            eprintln!("{}", entry.render());
        }

        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for live entries
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new(Some(LogLevel::Info))
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::info(msg).with_indent(indent));
}
