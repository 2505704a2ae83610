//! Structured logger for the console: level filter, console or JSON lines,
//! and child loggers that carry region/instance context.
//!
//! Log output goes to stderr so it never interleaves with the dashboard on
//! stdout.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name (case-insensitive). Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().trim() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns true if a message at `msg_level` passes this filter level.
    pub fn should_log(self, msg_level: LogLevel) -> bool {
        msg_level >= self
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Console,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().trim() {
            "console" => Some(Self::Console),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Console,
        }
    }
}

#[derive(Debug, Clone)]
enum LogTarget {
    Stderr,
    Buffer(Arc<Mutex<Vec<u8>>>),
}

#[derive(Debug, Clone)]
pub struct Logger {
    level: LogLevel,
    format: LogFormat,
    fields: Vec<(String, String)>,
    target: LogTarget,
}

impl Logger {
    pub fn new(cfg: &LoggingConfig) -> Self {
        Self {
            level: cfg.level,
            format: cfg.format,
            fields: Vec::new(),
            target: LogTarget::Stderr,
        }
    }

    /// Logger that appends to an in-memory buffer instead of stderr.
    pub fn with_buffer(cfg: &LoggingConfig, buffer: Arc<Mutex<Vec<u8>>>) -> Self {
        Self {
            target: LogTarget::Buffer(buffer),
            ..Self::new(cfg)
        }
    }

    /// Logger that drops everything below `Error`; used where no config
    /// has been loaded yet.
    pub fn quiet() -> Self {
        Self::new(&LoggingConfig {
            level: LogLevel::Error,
            format: LogFormat::Console,
        })
    }

    pub fn with_field(&self, key: &str, value: &str) -> Self {
        let mut child = self.clone();
        match child.fields.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.to_string(),
            None => child.fields.push((key.to_string(), value.to_string())),
        }
        child
    }

    pub fn component(&self, name: &str) -> Self {
        self.with_field("component", name)
    }

    pub fn with_region(&self, region_name: &str) -> Self {
        self.with_field("region", region_name)
    }

    pub fn with_instance(&self, uuid: &str) -> Self {
        self.with_field("instance", uuid)
    }

    pub fn log(&self, level: LogLevel, msg: &str) {
        self.log_with_fields(level, msg, &[]);
    }

    pub fn log_with_fields(&self, level: LogLevel, msg: &str, extra: &[(&str, &str)]) {
        if !self.level.should_log(level) {
            return;
        }
        let line = self.format_line(level, msg, extra);
        match &self.target {
            LogTarget::Stderr => {
                let stderr = std::io::stderr();
                let mut handle = stderr.lock();
                let _ = writeln!(handle, "{line}");
            }
            LogTarget::Buffer(buffer) => {
                let mut guard = match buffer.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                let _ = writeln!(guard, "{line}");
            }
        }
    }

    fn format_line(&self, level: LogLevel, msg: &str, extra: &[(&str, &str)]) -> String {
        let fields = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(extra.iter().copied());
        match self.format {
            LogFormat::Console => {
                let mut line = format!("{} {level} ", chrono::Utc::now().format("%H:%M:%S"));
                for (k, v) in fields {
                    line.push_str(&format!("{k}={v} "));
                }
                line.push_str(msg);
                line
            }
            LogFormat::Json => {
                let mut object = serde_json::Map::new();
                object.insert(
                    "time".to_string(),
                    chrono::Utc::now().to_rfc3339().into(),
                );
                object.insert("level".to_string(), level.to_string().into());
                for (k, v) in fields {
                    object.insert(k.to_string(), v.into());
                }
                object.insert("message".to_string(), msg.into());
                serde_json::Value::Object(object).to_string()
            }
        }
    }

    pub fn trace(&self, msg: &str) {
        self.log(LogLevel::Trace, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(LogLevel::Info, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.log(LogLevel::Warn, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(LogLevel::Error, msg);
    }

    pub fn info_with(&self, msg: &str, fields: &[(&str, &str)]) {
        self.log_with_fields(LogLevel::Info, msg, fields);
    }

    pub fn debug_with(&self, msg: &str, fields: &[(&str, &str)]) {
        self.log_with_fields(LogLevel::Debug, msg, fields);
    }

    pub fn warn_with(&self, msg: &str, fields: &[(&str, &str)]) {
        self.log_with_fields(LogLevel::Warn, msg, fields);
    }
}
