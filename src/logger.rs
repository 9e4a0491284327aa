//! Process-wide logging for wgswitch.
//!
//! Entries at or above the minimum level are written to stderr as structured
//! lines so operator output on stdout stays clean. Nothing is written until
//! [`configure`] runs.

use std::io::Write;
use std::sync::{Mutex, OnceLock};
use std::time::SystemTime;

use crate::constants;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Verbose debugging information
    Debug = 0,
    /// Informational messages about normal operation
    Info = 1,
    /// Warning messages about potential issues
    Warning = 2,
    /// Error messages about failures
    Error = 3,
}

impl LogLevel {
    /// Get the prefix string for this log level
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warning => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

/// A single log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub category: String,
    pub message: String,
}

impl LogEntry {
    /// Format the log entry as a structured line:
    /// `[HH:MM:SS] [LEVEL] CATEGORY: message`
    pub fn format(&self) -> String {
        let time_str = crate::utils::format_system_time_local(self.timestamp);
        format!(
            "[{}] [{}] {}: {}",
            time_str,
            self.level.prefix(),
            self.category,
            self.message
        )
    }
}

struct Logger {
    min_level: LogLevel,
    sink: Option<Box<dyn Write + Send>>,
}

impl Logger {
    fn new() -> Self {
        Self {
            min_level: parse_log_level(constants::DEFAULT_LOG_LEVEL),
            sink: None,
        }
    }

    fn log(&mut self, level: LogLevel, category: &str, message: String) {
        if level < self.min_level {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        let entry = LogEntry {
            timestamp: SystemTime::now(),
            level,
            category: category.to_string(),
            message,
        };
        let _ = writeln!(sink, "{}", entry.format());
    }
}

/// Global logger instance (thread-safe)
static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

fn get_logger() -> &'static Mutex<Logger> {
    LOGGER.get_or_init(|| Mutex::new(Logger::new()))
}

/// Log a message with the specified level and category
pub fn log(level: LogLevel, category: &str, message: impl Into<String>) {
    if let Ok(mut logger) = get_logger().lock() {
        logger.log(level, category, message.into());
    }
}

/// Configure the logger from user settings and start writing to stderr.
///
/// Call once at startup after loading `AppConfig`.
/// `log_level` is one of `"debug"`, `"info"`, `"warning"`, `"error"` (case-insensitive).
pub fn configure(log_level: &str) {
    if let Ok(mut logger) = get_logger().lock() {
        logger.min_level = parse_log_level(log_level);
        logger.sink = Some(Box::new(std::io::stderr()));
    }
}

/// Parse a log level string (case-insensitive) into a `LogLevel`.
///
/// Falls back to `LogLevel::Info` for unrecognised values.
#[must_use]
pub fn parse_log_level(s: &str) -> LogLevel {
    match s.trim().to_ascii_lowercase().as_str() {
        "debug" => LogLevel::Debug,
        "warning" | "warn" => LogLevel::Warning,
        "error" | "err" => LogLevel::Error,
        _ => LogLevel::Info,
    }
}

#[macro_export]
macro_rules! log_debug {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Debug, $category, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Info, $category, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Warning, $category, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Error, $category, format!($($arg)*))
    };
}
