//! Log entry structure

use super::fields::{FieldValue, Fields};
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};

/// One structured log record.
///
/// Built by value with the `with_*` methods before it is handed to a
/// handler; there are no setters, so an entry cannot change while a
/// handler holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    timestamp: DateTime<Utc>,
    level: LogLevel,
    channel: String,
    message: String,
    context: Fields,
    extra: Fields,
}

impl LogEntry {
    pub fn new(level: LogLevel, channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            channel: channel.into(),
            message: message.into(),
            context: Fields::new(),
            extra: Fields::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_context(mut self, context: Fields) -> Self {
        self.context = context;
        self
    }

    pub fn with_extra(mut self, extra: Fields) -> Self {
        self.extra = extra;
        self
    }

    /// Add a single `extra` field; used by processors
    pub fn with_extra_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.extra.insert(key, value);
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &Fields {
        &self.context
    }

    pub fn extra(&self) -> &Fields {
        &self.extra
    }
}
