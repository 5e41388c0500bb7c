//! Logging options and structured log output.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Log level for structured logs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Suppresses all output.
    Silent,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Silent => write!(f, "SILENT"),
        }
    }
}

/// Error returned when parsing an unknown level name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "silent" | "off" => Ok(Self::Silent),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (for production/log aggregation).
    Json,
    /// Human-readable format (for development).
    #[default]
    Human,
}

/// A structured log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Log level.
    pub level: LogLevel,
    /// Subsystem that emitted the entry (e.g., "routeCache").
    pub label: String,
    /// Log message.
    pub message: String,
    /// Additional structured fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl LogEntry {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = format!("[{}] [{}] {}", self.level, self.label, self.message);

        if !self.fields.is_empty() {
            s.push_str(" | ");
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            s.push_str(&fields.join(" "));
        }

        s
    }
}

/// In-memory sink that keeps every emitted entry.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
    }

    /// Snapshot of captured entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Captured entries with the given label.
    pub fn with_label(&self, label: &str) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.label == label)
            .collect()
    }

    /// Drop captured entries.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

/// Where log entries are written.
#[derive(Debug, Clone, Default)]
pub enum LogDestination {
    /// Formatted lines on stderr.
    #[default]
    Stderr,
    /// Forwarded as `tracing` events; the host installs the subscriber.
    Tracing,
    /// Captured in memory.
    Memory(MemorySink),
}

/// Destination names accepted in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Stderr,
    Tracing,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Stderr => Self::Stderr,
            LogTarget::Tracing => Self::Tracing,
        }
    }
}

/// Logging configuration shared by the render environment and its services.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Minimum level that is emitted.
    pub level: LogLevel,
    /// Output format for `Stderr`.
    pub format: LogFormat,
    /// Output destination.
    pub dest: LogDestination,
}

impl LogOptions {
    /// Create options writing to stderr at the given level.
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Options that capture entries in memory, returning the sink.
    pub fn memory(level: LogLevel) -> (Self, MemorySink) {
        let sink = MemorySink::new();
        let options = Self {
            level,
            format: LogFormat::Json,
            dest: LogDestination::Memory(sink.clone()),
        };
        (options, sink)
    }

    /// Set output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set output destination.
    pub fn with_dest(mut self, dest: LogDestination) -> Self {
        self.dest = dest;
        self
    }

    /// Whether entries at `level` are emitted.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Silent && self.level != LogLevel::Silent && level >= self.level
    }

    /// Log at debug level.
    pub fn debug(&self, label: &str, message: &str) {
        self.log(LogLevel::Debug, label, message, BTreeMap::new());
    }

    /// Log at info level.
    pub fn info(&self, label: &str, message: &str) {
        self.log(LogLevel::Info, label, message, BTreeMap::new());
    }

    /// Log at warn level.
    pub fn warn(&self, label: &str, message: &str) {
        self.log(LogLevel::Warn, label, message, BTreeMap::new());
    }

    /// Log at error level.
    pub fn error(&self, label: &str, message: &str) {
        self.log(LogLevel::Error, label, message, BTreeMap::new());
    }

    fn log(
        &self,
        level: LogLevel,
        label: &str,
        message: &str,
        fields: BTreeMap<String, serde_json::Value>,
    ) {
        if !self.enabled(level) {
            return;
        }

        let entry = LogEntry {
            level,
            label: label.to_string(),
            message: message.to_string(),
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        match &self.dest {
            LogDestination::Stderr => {
                let output = match self.format {
                    LogFormat::Json => entry.to_json(),
                    LogFormat::Human => entry.to_human(),
                };
                eprintln!("{}", output);
            }
            LogDestination::Tracing => forward_to_tracing(&entry),
            LogDestination::Memory(sink) => sink.push(entry),
        }
    }
}

fn forward_to_tracing(entry: &LogEntry) {
    let fields = serde_json::Value::Object(
        entry
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    );
    let label = entry.label.as_str();
    let message = entry.message.as_str();

    match entry.level {
        LogLevel::Trace => tracing::trace!(target: "stellar", label, %fields, "{}", message),
        LogLevel::Debug => tracing::debug!(target: "stellar", label, %fields, "{}", message),
        LogLevel::Info => tracing::info!(target: "stellar", label, %fields, "{}", message),
        LogLevel::Warn => tracing::warn!(target: "stellar", label, %fields, "{}", message),
        LogLevel::Error => tracing::error!(target: "stellar", label, %fields, "{}", message),
        LogLevel::Silent => {}
    }
}

/// Builder for log entries with fluent API.
pub struct LogBuilder<'a> {
    options: &'a LogOptions,
    level: LogLevel,
    label: String,
    message: String,
    fields: BTreeMap<String, serde_json::Value>,
}

impl<'a> LogBuilder<'a> {
    /// Create a new log builder.
    pub fn new(
        options: &'a LogOptions,
        level: LogLevel,
        label: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            options,
            level,
            label: label.into(),
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a string field.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::json!(value.into()));
        self
    }

    /// Add an integer field.
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a boolean field.
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Emit the log entry.
    pub fn emit(self) {
        self.options
            .log(self.level, &self.label, &self.message, self.fields);
    }
}

impl LogOptions {
    /// Start building a debug log entry.
    pub fn debug_builder(&self, label: &str, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Debug, label, message)
    }

    /// Start building an info log entry.
    pub fn info_builder(&self, label: &str, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Info, label, message)
    }

    /// Start building a warn log entry.
    pub fn warn_builder(&self, label: &str, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Warn, label, message)
    }
}
