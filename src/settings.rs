//! Serde-facing configuration
//!
//! [`LogtailSettings`] is the shape to embed in an application's own config
//! file. Every field except `token` is optional and falls back to the same
//! defaults as [`LogtailHandlerBuilder`].

use crate::core::{
    LogLevel, Result, DEFAULT_BUBBLE, DEFAULT_BUFFER_LIMIT, DEFAULT_CONNECTION_TIMEOUT,
    DEFAULT_ENDPOINT, DEFAULT_FLUSH_INTERVAL, DEFAULT_FLUSH_ON_OVERFLOW, DEFAULT_LEVEL,
    DEFAULT_THROW_ON_FAILURE, DEFAULT_TIMEOUT,
};
use crate::handlers::{LogtailHandler, LogtailHandlerBuilder, SynchronousLogtailHandler};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Handler settings as they appear in a configuration file
///
/// ```
/// use rust_logtail_sink::settings::LogtailSettings;
///
/// let settings: LogtailSettings = serde_json::from_str(
///     r#"{ "token": "source-token", "level": "warn", "flush_interval_ms": null }"#,
/// )
/// .unwrap();
///
/// let handler = settings.builder().build().unwrap();
/// assert!(!handler.has_timer());
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogtailSettings {
    pub token: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Level name, case-insensitive
    #[serde(default = "default_level", deserialize_with = "deserialize_level")]
    pub level: LogLevel,

    #[serde(default = "default_bubble")]
    pub bubble: bool,

    #[serde(default = "default_buffer_limit")]
    pub buffer_limit: usize,

    #[serde(default = "default_flush_on_overflow")]
    pub flush_on_overflow: bool,

    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// `null` disables the periodic flush
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: Option<u64>,

    #[serde(default = "default_throw_on_failure")]
    pub throw_on_failure: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_level() -> LogLevel {
    DEFAULT_LEVEL
}

fn default_bubble() -> bool {
    DEFAULT_BUBBLE
}

fn default_buffer_limit() -> usize {
    DEFAULT_BUFFER_LIMIT
}

fn default_flush_on_overflow() -> bool {
    DEFAULT_FLUSH_ON_OVERFLOW
}

fn default_connection_timeout_ms() -> u64 {
    DEFAULT_CONNECTION_TIMEOUT.as_millis() as u64
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_flush_interval_ms() -> Option<u64> {
    Some(DEFAULT_FLUSH_INTERVAL.as_millis() as u64)
}

fn default_throw_on_failure() -> bool {
    DEFAULT_THROW_ON_FAILURE
}

fn deserialize_level<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<LogLevel, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl LogtailSettings {
    /// Settings with every optional field at its default
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: default_endpoint(),
            level: default_level(),
            bubble: default_bubble(),
            buffer_limit: default_buffer_limit(),
            flush_on_overflow: default_flush_on_overflow(),
            connection_timeout_ms: default_connection_timeout_ms(),
            timeout_ms: default_timeout_ms(),
            flush_interval_ms: default_flush_interval_ms(),
            throw_on_failure: default_throw_on_failure(),
        }
    }

    /// A builder preloaded with these settings
    pub fn builder(&self) -> LogtailHandlerBuilder {
        LogtailHandlerBuilder::with_source_token(self.token.as_str())
            .with_endpoint(self.endpoint.as_str())
            .with_level(self.level)
            .with_log_bubbling(self.bubble)
            .with_buffer_limit(self.buffer_limit)
            .with_flush_on_overflow(self.flush_on_overflow)
            .with_connection_timeout_millis(self.connection_timeout_ms)
            .with_timeout_millis(self.timeout_ms)
            .with_flush_interval_millis(self.flush_interval_ms)
            .with_exception_throwing(self.throw_on_failure)
    }

    pub fn build(&self) -> Result<LogtailHandler> {
        self.builder().build()
    }

    pub fn build_synchronous(&self) -> Result<SynchronousLogtailHandler> {
        self.builder().build_synchronous()
    }
}

impl fmt::Debug for LogtailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogtailSettings")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("level", &self.level)
            .field("bubble", &self.bubble)
            .field("buffer_limit", &self.buffer_limit)
            .field("flush_on_overflow", &self.flush_on_overflow)
            .field("connection_timeout_ms", &self.connection_timeout_ms)
            .field("timeout_ms", &self.timeout_ms)
            .field("flush_interval_ms", &self.flush_interval_ms)
            .field("throw_on_failure", &self.throw_on_failure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_only_token_is_required() {
        let settings: LogtailSettings = serde_json::from_str(r#"{"token": "abc"}"#).unwrap();
        assert_eq!(settings, LogtailSettings::new("abc"));

        let missing = serde_json::from_str::<LogtailSettings>("{}");
        assert!(missing.is_err());
    }

    #[test]
    fn test_full_document() {
        let settings: LogtailSettings = serde_json::from_str(
            r#"{
                "token": "abc",
                "endpoint": "http://localhost:8080",
                "level": "ERROR",
                "bubble": false,
                "buffer_limit": 50,
                "flush_on_overflow": false,
                "connection_timeout_ms": 250,
                "timeout_ms": 750,
                "flush_interval_ms": 100,
                "throw_on_failure": true
            }"#,
        )
        .unwrap();

        let config = settings.builder().config().unwrap();
        assert_eq!(config.delivery.endpoint, "http://localhost:8080");
        assert_eq!(config.level, LogLevel::Error);
        assert!(!config.bubble);
        assert_eq!(config.flush.buffer_limit, 50);
        assert!(!config.flush.flush_on_overflow);
        assert_eq!(config.delivery.connection_timeout, Duration::from_millis(250));
        assert_eq!(config.delivery.timeout, Duration::from_millis(750));
        assert_eq!(config.flush.flush_interval, Some(Duration::from_millis(100)));
        assert!(config.delivery.throw_on_failure);
    }

    #[test]
    fn test_null_interval_disables_timer() {
        let settings: LogtailSettings =
            serde_json::from_str(r#"{"token": "abc", "flush_interval_ms": null}"#).unwrap();

        assert_eq!(settings.flush_interval_ms, None);
        assert_eq!(settings.builder().config().unwrap().flush.flush_interval, None);
    }

    #[test]
    fn test_rejects_unknown_level_and_fields() {
        assert!(serde_json::from_str::<LogtailSettings>(r#"{"token": "a", "level": "loud"}"#).is_err());
        assert!(serde_json::from_str::<LogtailSettings>(r#"{"token": "a", "retries": 3}"#).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let settings = LogtailSettings::new("super-secret");
        assert!(!format!("{:?}", settings).contains("super-secret"));
    }
}
