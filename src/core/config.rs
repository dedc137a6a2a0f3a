//! Delivery and flush configuration
//!
//! These values are produced by `LogtailHandlerBuilder` (or assembled by
//! hand) and are fixed once a handler is constructed.

use super::error::{Result, SinkError};
use super::log_level::LogLevel;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Production ingestion address used when no endpoint is configured
pub const DEFAULT_ENDPOINT: &str = "https://in.logs.betterstack.com";
pub const DEFAULT_BUBBLE: bool = true;
pub const DEFAULT_BUFFER_LIMIT: usize = 1000;
pub const DEFAULT_FLUSH_ON_OVERFLOW: bool = true;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_THROW_ON_FAILURE: bool = false;
pub const DEFAULT_LEVEL: LogLevel = LogLevel::Debug;

/// Callback invoked for every batch that could not be delivered
///
/// Runs on whichever thread performed the send, including the flush timer.
pub type FailureCallback = Arc<dyn Fn(&SinkError) + Send + Sync>;

/// Where and how batches are delivered
#[derive(Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub token: String,
    pub endpoint: String,
    /// Budget for establishing the connection
    pub connection_timeout: Duration,
    /// Budget for the whole request
    pub timeout: Duration,
    /// Return delivery failures to the caller instead of swallowing them
    pub throw_on_failure: bool,
}

impl DeliveryConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
            throw_on_failure: DEFAULT_THROW_ON_FAILURE,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(SinkError::config("DeliveryConfig", "source token must not be empty"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(SinkError::config("DeliveryConfig", "endpoint must not be empty"));
        }
        if self.connection_timeout.is_zero() {
            return Err(SinkError::config(
                "DeliveryConfig",
                "connection timeout must be positive",
            ));
        }
        if self.timeout.is_zero() {
            return Err(SinkError::config("DeliveryConfig", "request timeout must be positive"));
        }
        Ok(())
    }
}

impl fmt::Debug for DeliveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryConfig")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("connection_timeout", &self.connection_timeout)
            .field("timeout", &self.timeout)
            .field("throw_on_failure", &self.throw_on_failure)
            .finish()
    }
}

/// When buffered entries are flushed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushPolicy {
    /// Maximum number of buffered entries
    pub buffer_limit: usize,
    /// Flush as soon as the buffer reaches `buffer_limit`; when off, entries
    /// arriving at a full buffer are dropped
    pub flush_on_overflow: bool,
    /// Period of the background flush; `None` disables it
    pub flush_interval: Option<Duration>,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            buffer_limit: DEFAULT_BUFFER_LIMIT,
            flush_on_overflow: DEFAULT_FLUSH_ON_OVERFLOW,
            flush_interval: Some(DEFAULT_FLUSH_INTERVAL),
        }
    }
}

impl FlushPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.buffer_limit == 0 {
            return Err(SinkError::config("FlushPolicy", "buffer limit must be positive"));
        }
        if self.flush_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(SinkError::config(
                "FlushPolicy",
                "flush interval must be positive (use None to disable it)",
            ));
        }
        Ok(())
    }
}

/// Everything a handler needs
#[derive(Clone)]
pub struct HandlerConfig {
    pub delivery: DeliveryConfig,
    pub flush: FlushPolicy,
    /// Minimum level an entry needs to be handled
    pub level: LogLevel,
    /// Let handled entries continue to the next handler in the chain
    pub bubble: bool,
    pub on_failure: Option<FailureCallback>,
}

impl HandlerConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            delivery: DeliveryConfig::new(token),
            flush: FlushPolicy::default(),
            level: DEFAULT_LEVEL,
            bubble: DEFAULT_BUBBLE,
            on_failure: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.delivery.validate()?;
        self.flush.validate()
    }
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("delivery", &self.delivery)
            .field("flush", &self.flush)
            .field("level", &self.level)
            .field("bubble", &self.bubble)
            .field("on_failure", &self.on_failure.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HandlerConfig::new("token");

        assert_eq!(config.delivery.endpoint, "https://in.logs.betterstack.com");
        assert_eq!(config.delivery.connection_timeout, Duration::from_millis(5000));
        assert_eq!(config.delivery.timeout, Duration::from_millis(5000));
        assert!(!config.delivery.throw_on_failure);
        assert_eq!(config.flush.buffer_limit, 1000);
        assert!(config.flush.flush_on_overflow);
        assert_eq!(config.flush.flush_interval, Some(Duration::from_millis(5000)));
        assert_eq!(config.level, LogLevel::Debug);
        assert!(config.bubble);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(HandlerConfig::new("").validate().is_err());
        assert!(HandlerConfig::new("   ").validate().is_err());

        let mut config = HandlerConfig::new("token");
        config.flush.buffer_limit = 0;
        assert!(config.validate().is_err());

        let mut config = HandlerConfig::new("token");
        config.flush.flush_interval = Some(Duration::ZERO);
        assert!(config.validate().is_err());

        let mut config = HandlerConfig::new("token");
        config.flush.flush_interval = None;
        assert!(config.validate().is_ok());

        let mut config = HandlerConfig::new("token");
        config.delivery.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = HandlerConfig::new("super-secret");
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
