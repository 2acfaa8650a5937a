// crates/studio-proxy-core/src/log.rs
// ============================================================================
// Module: Structured Logging
// Description: JSON-line log events and pluggable sinks.
// Purpose: Emit leveled, structured logs gated by the env logging switches.
// Dependencies: serde, serde_json, studio-proxy-config
// ============================================================================

//! ## Overview
//! Log events are serialized as one JSON object per line and handed to a
//! [`LogSink`]. There is no global logger; components hold a [`Logger`]
//! carrying the sink, the minimum level, and the component name.
//! [`Logger::from_config`] derives the threshold from `SERVER_LOG_LEVEL`,
//! `DEBUG_LOGS_ENABLED`, and `TRACE_LOGS_ENABLED`, and picks a file sink when
//! `LOG_FILE` is set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;
use studio_proxy_config::LoggingConfig;
use studio_proxy_config::ServerLogLevel;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Log severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Very verbose diagnostics.
    Trace,
    /// Debug diagnostics.
    Debug,
    /// Normal operation.
    Info,
    /// Recoverable problems.
    Warning,
    /// Failed operations.
    Error,
    /// Service-threatening failures.
    Critical,
}

impl From<ServerLogLevel> for LogLevel {
    fn from(level: ServerLogLevel) -> Self {
        match level {
            ServerLogLevel::Debug => Self::Debug,
            ServerLogLevel::Info => Self::Info,
            ServerLogLevel::Warning => Self::Warning,
            ServerLogLevel::Error => Self::Error,
            ServerLogLevel::Critical => Self::Critical,
        }
    }
}

/// Structured log event payload.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Event severity.
    pub level: LogLevel,
    /// Emitting component.
    pub component: String,
    /// Human-readable message.
    pub message: String,
    /// Structured fields.
    pub fields: Value,
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Log sink for structured events.
pub trait LogSink: Send + Sync {
    /// Record a log event.
    fn record(&self, event: &LogEvent);
}

/// Log sink that writes JSON lines to stderr.
pub struct StderrLogSink;

impl LogSink for StderrLogSink {
    fn record(&self, event: &LogEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Log sink that appends JSON lines to a file.
pub struct FileLogSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileLogSink {
    /// Opens the log file in append mode, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileLogSink {
    fn record(&self, event: &LogEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op log sink.
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    fn record(&self, _event: &LogEvent) {}
}

// ============================================================================
// SECTION: Logger
// ============================================================================

/// Leveled logger bound to a component name.
#[derive(Clone)]
pub struct Logger {
    /// Destination for events.
    sink: Arc<dyn LogSink>,
    /// Events below this level are dropped.
    min_level: LogLevel,
    /// Component name attached to every event.
    component: String,
}

impl Logger {
    /// Creates a logger writing to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>, min_level: LogLevel, component: impl Into<String>) -> Self {
        Self {
            sink,
            min_level,
            component: component.into(),
        }
    }

    /// Creates a logger that discards every event.
    #[must_use]
    pub fn noop(component: impl Into<String>) -> Self {
        Self::new(Arc::new(NoopLogSink), LogLevel::Critical, component)
    }

    /// Builds a logger from the env logging settings.
    ///
    /// # Errors
    ///
    /// Returns an error when `LOG_FILE` is set but cannot be opened.
    pub fn from_config(config: &LoggingConfig, component: impl Into<String>) -> io::Result<Self> {
        let sink: Arc<dyn LogSink> = match &config.log_file {
            Some(path) => Arc::new(FileLogSink::new(path)?),
            None => Arc::new(StderrLogSink),
        };
        Ok(Self::new(sink, threshold(config), component))
    }

    /// Returns a logger sharing this sink under another component name.
    #[must_use]
    pub fn for_component(&self, component: impl Into<String>) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            min_level: self.min_level,
            component: component.into(),
        }
    }

    /// Returns the minimum emitted level.
    #[must_use]
    pub const fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Returns true when events at `level` are emitted.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Emits an event at `level` when enabled.
    pub fn log(&self, level: LogLevel, event: &'static str, message: &str, fields: Value) {
        if !self.enabled(level) {
            return;
        }
        self.sink.record(&LogEvent {
            event,
            timestamp_ms: now_millis(),
            level,
            component: self.component.clone(),
            message: message.to_string(),
            fields,
        });
    }

    /// Emits a trace event.
    pub fn trace(&self, event: &'static str, message: &str, fields: Value) {
        self.log(LogLevel::Trace, event, message, fields);
    }

    /// Emits a debug event.
    pub fn debug(&self, event: &'static str, message: &str, fields: Value) {
        self.log(LogLevel::Debug, event, message, fields);
    }

    /// Emits an info event.
    pub fn info(&self, event: &'static str, message: &str, fields: Value) {
        self.log(LogLevel::Info, event, message, fields);
    }

    /// Emits a warning event.
    pub fn warn(&self, event: &'static str, message: &str, fields: Value) {
        self.log(LogLevel::Warning, event, message, fields);
    }

    /// Emits an error event.
    pub fn error(&self, event: &'static str, message: &str, fields: Value) {
        self.log(LogLevel::Error, event, message, fields);
    }
}

/// Derives the minimum level from the env logging switches.
#[must_use]
pub fn threshold(config: &LoggingConfig) -> LogLevel {
    let configured = LogLevel::from(config.level);
    if config.trace_logs {
        LogLevel::Trace
    } else if config.debug_logs {
        configured.min(LogLevel::Debug)
    } else {
        configured
    }
}

/// Returns milliseconds since the Unix epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|duration| duration.as_millis()).unwrap_or(0)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only assertions are permitted."
    )]

    use std::fs;

    use serde_json::json;

    use super::*;

    fn logging(level: ServerLogLevel, debug_logs: bool, trace_logs: bool) -> LoggingConfig {
        LoggingConfig {
            level,
            redirect_print: false,
            debug_logs,
            trace_logs,
            log_file: None,
        }
    }

    #[test]
    fn threshold_follows_switches() {
        assert_eq!(threshold(&logging(ServerLogLevel::Warning, false, false)), LogLevel::Warning);
        assert_eq!(threshold(&logging(ServerLogLevel::Warning, true, false)), LogLevel::Debug);
        assert_eq!(threshold(&logging(ServerLogLevel::Error, false, true)), LogLevel::Trace);
        assert_eq!(threshold(&logging(ServerLogLevel::Debug, true, false)), LogLevel::Debug);
    }

    #[test]
    fn file_sink_writes_filtered_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");
        let config = LoggingConfig {
            log_file: Some(path.clone()),
            ..logging(ServerLogLevel::Info, false, false)
        };
        let logger = Logger::from_config(&config, "test").unwrap();
        logger.debug("dropped", "below threshold", json!({}));
        logger.info("kept", "at threshold", json!({ "count": 2 }));
        logger.for_component("other").error("failed", "above threshold", Value::Null);

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> =
            text.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "kept");
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["component"], "test");
        assert_eq!(lines[0]["fields"]["count"], 2);
        assert_eq!(lines[1]["component"], "other");
        assert_eq!(lines[1]["level"], "error");
    }

    #[test]
    fn noop_logger_emits_nothing() {
        let logger = Logger::noop("quiet");
        assert!(!logger.enabled(LogLevel::Error));
        assert!(logger.enabled(LogLevel::Critical));
    }
}
