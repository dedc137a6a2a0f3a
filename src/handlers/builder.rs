//! Fluent construction of Logtail handlers

use super::{LogtailHandler, SynchronousLogtailHandler};
use crate::core::{FailureCallback, HandlerConfig, LogLevel, Result, SinkError};
use crate::transport::Transport;
use std::sync::Arc;
use std::time::Duration;

/// Immutable builder for [`LogtailHandler`] and [`SynchronousLogtailHandler`]
///
/// Every `with_*` method leaves the receiver untouched and returns a
/// modified copy, so a partially configured builder can be shared as a
/// template.
///
/// # Example
///
/// ```no_run
/// use rust_logtail_sink::prelude::*;
///
/// let base = LogtailHandlerBuilder::with_source_token("source-token")
///     .with_level(LogLevel::Info);
///
/// let buffered = base.with_buffer_limit(500).build().unwrap();
/// let immediate = base.with_log_bubbling(false).build_synchronous().unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct LogtailHandlerBuilder {
    config: HandlerConfig,
}

impl LogtailHandlerBuilder {
    /// Start from the defaults with the given source token
    #[must_use]
    pub fn with_source_token(token: impl Into<String>) -> Self {
        Self {
            config: HandlerConfig::new(token),
        }
    }

    fn modified(&self, apply: impl FnOnce(&mut HandlerConfig)) -> Self {
        let mut copy = self.clone();
        apply(&mut copy.config);
        copy
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_endpoint(&self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.modified(|config| config.delivery.endpoint = endpoint)
    }

    /// Minimum level an entry needs to be handled
    #[must_use = "builder methods return a new value"]
    pub fn with_level(&self, level: LogLevel) -> Self {
        self.modified(|config| config.level = level)
    }

    /// Whether handled entries continue to the next handler
    #[must_use = "builder methods return a new value"]
    pub fn with_log_bubbling(&self, bubble: bool) -> Self {
        self.modified(|config| config.bubble = bubble)
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_buffer_limit(&self, buffer_limit: usize) -> Self {
        self.modified(|config| config.flush.buffer_limit = buffer_limit)
    }

    /// Flush when the buffer fills; when off, entries arriving at a full
    /// buffer are dropped
    #[must_use = "builder methods return a new value"]
    pub fn with_flush_on_overflow(&self, flush_on_overflow: bool) -> Self {
        self.modified(|config| config.flush.flush_on_overflow = flush_on_overflow)
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_connection_timeout_millis(&self, millis: u64) -> Self {
        self.modified(|config| config.delivery.connection_timeout = Duration::from_millis(millis))
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_timeout_millis(&self, millis: u64) -> Self {
        self.modified(|config| config.delivery.timeout = Duration::from_millis(millis))
    }

    /// Period of the background flush; `None` disables the timer
    #[must_use = "builder methods return a new value"]
    pub fn with_flush_interval_millis(&self, millis: Option<u64>) -> Self {
        self.modified(|config| config.flush.flush_interval = millis.map(Duration::from_millis))
    }

    /// Return delivery failures to the caller instead of logging them
    #[must_use = "builder methods return a new value"]
    pub fn with_exception_throwing(&self, throw_on_failure: bool) -> Self {
        self.modified(|config| config.delivery.throw_on_failure = throw_on_failure)
    }

    /// Called with the error of every batch that could not be delivered
    #[must_use = "builder methods return a new value"]
    pub fn with_failure_callback<F>(&self, callback: F) -> Self
    where
        F: Fn(&SinkError) + Send + Sync + 'static,
    {
        let callback: FailureCallback = Arc::new(callback);
        self.modified(|config| config.on_failure = Some(callback))
    }

    /// Validated copy of the accumulated configuration
    pub fn config(&self) -> Result<HandlerConfig> {
        self.config.validate()?;
        Ok(self.config.clone())
    }

    pub fn build(&self) -> Result<LogtailHandler> {
        LogtailHandler::with_config(self.config()?)
    }

    pub fn build_synchronous(&self) -> Result<SynchronousLogtailHandler> {
        SynchronousLogtailHandler::with_config(self.config()?)
    }

    pub fn build_with_transport(&self, transport: Arc<dyn Transport>) -> Result<LogtailHandler> {
        LogtailHandler::with_transport(self.config()?, transport)
    }

    pub fn build_synchronous_with_transport(
        &self,
        transport: Arc<dyn Transport>,
    ) -> Result<SynchronousLogtailHandler> {
        SynchronousLogtailHandler::with_transport(self.config()?, transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogEntry, DEFAULT_ENDPOINT};
    use crate::transport::MemoryTransport;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_defaults() {
        let config = LogtailHandlerBuilder::with_source_token("token")
            .config()
            .unwrap();

        assert_eq!(config.delivery.token, "token");
        assert_eq!(config.delivery.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.delivery.connection_timeout, Duration::from_millis(5000));
        assert_eq!(config.delivery.timeout, Duration::from_millis(5000));
        assert!(!config.delivery.throw_on_failure);
        assert_eq!(config.flush.buffer_limit, 1000);
        assert!(config.flush.flush_on_overflow);
        assert_eq!(config.flush.flush_interval, Some(Duration::from_millis(5000)));
        assert_eq!(config.level, LogLevel::Debug);
        assert!(config.bubble);
        assert!(config.on_failure.is_none());
    }

    #[test]
    fn test_with_methods_leave_original_untouched() {
        let base = LogtailHandlerBuilder::with_source_token("token");
        let derived = base
            .with_endpoint("http://localhost:9000")
            .with_level(LogLevel::Error)
            .with_log_bubbling(false)
            .with_buffer_limit(10)
            .with_flush_on_overflow(false)
            .with_connection_timeout_millis(100)
            .with_timeout_millis(200)
            .with_flush_interval_millis(None)
            .with_exception_throwing(true);

        let untouched = base.config().unwrap();
        assert_eq!(untouched.delivery.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(untouched.level, LogLevel::Debug);
        assert_eq!(untouched.flush.buffer_limit, 1000);

        let config = derived.config().unwrap();
        assert_eq!(config.delivery.endpoint, "http://localhost:9000");
        assert_eq!(config.level, LogLevel::Error);
        assert!(!config.bubble);
        assert_eq!(config.flush.buffer_limit, 10);
        assert!(!config.flush.flush_on_overflow);
        assert_eq!(config.delivery.connection_timeout, Duration::from_millis(100));
        assert_eq!(config.delivery.timeout, Duration::from_millis(200));
        assert_eq!(config.flush.flush_interval, None);
        assert!(config.delivery.throw_on_failure);
    }

    #[test]
    fn test_invalid_values_fail_at_build() {
        let base = LogtailHandlerBuilder::with_source_token("token");

        assert!(LogtailHandlerBuilder::with_source_token("").config().is_err());
        assert!(base.with_buffer_limit(0).config().is_err());
        assert!(base.with_connection_timeout_millis(0).config().is_err());
        assert!(base.with_timeout_millis(0).config().is_err());
        assert!(base.with_flush_interval_millis(Some(0)).config().is_err());

        let err = base
            .with_buffer_limit(0)
            .build_with_transport(Arc::new(MemoryTransport::new()))
            .unwrap_err();
        assert!(matches!(err, SinkError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_debug_redacts_token() {
        let builder = LogtailHandlerBuilder::with_source_token("super-secret");
        assert!(!format!("{:?}", builder).contains("super-secret"));
    }

    #[test]
    fn test_failure_callback_reaches_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);

        let handler = LogtailHandlerBuilder::with_source_token("token")
            .with_failure_callback(move |_| {
                calls_clone.fetch_add(1, Ordering::Relaxed);
            })
            .build_synchronous_with_transport(Arc::new(MemoryTransport::failing_with(503)))
            .unwrap();

        handler
            .handle(LogEntry::new(LogLevel::Info, "app", "lost"))
            .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_build_with_transport_respects_interval() {
        let builder = LogtailHandlerBuilder::with_source_token("token");

        let with_timer = builder
            .build_with_transport(Arc::new(MemoryTransport::new()))
            .unwrap();
        assert!(with_timer.has_timer());

        let without_timer = builder
            .with_flush_interval_millis(None)
            .build_with_transport(Arc::new(MemoryTransport::new()))
            .unwrap();
        assert!(!without_timer.has_timer());
    }
}
