//! Minimal channel logger that walks a handler stack

use super::{
    error::Result,
    fields::Fields,
    handler::Handler,
    log_entry::LogEntry,
    log_level::LogLevel,
    processor::Processor,
};
use std::sync::Arc;

/// Named channel that turns log calls into entries and offers them to its
/// handlers in order.
///
/// The first handler returning `true` from [`Handler::handle`] stops the
/// walk. Handlers whose threshold the entry does not meet are skipped.
pub struct Logger {
    channel: String,
    handlers: Vec<Arc<dyn Handler>>,
    processors: Vec<Box<dyn Processor>>,
}

impl Logger {
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            handlers: Vec::new(),
            processors: Vec::new(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn push_handler(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.push(handler);
    }

    pub fn push_processor<P: Processor + 'static>(&mut self, processor: P) {
        self.processors.push(Box::new(processor));
    }

    /// Whether any handler would accept an entry at `level`
    pub fn is_handling(&self, level: LogLevel) -> bool {
        self.handlers.iter().any(|handler| handler.is_handling(level))
    }

    /// Build an entry and dispatch it.
    ///
    /// Errors come only from handlers configured to surface delivery
    /// failures; the walk stops at the failing handler.
    pub fn log(&self, level: LogLevel, message: impl Into<String>, context: Fields) -> Result<()> {
        if !self.is_handling(level) {
            return Ok(());
        }

        let entry = LogEntry::new(level, self.channel.as_str(), message).with_context(context);
        let entry = self
            .processors
            .iter()
            .fold(entry, |entry, processor| processor.process(entry));

        for handler in &self.handlers {
            if !handler.is_handling(level) {
                continue;
            }
            if handler.handle(entry.clone())? {
                break;
            }
        }
        Ok(())
    }

    /// Flush every handler, returning the first error after trying all
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for handler in &self.handlers {
            if let Err(err) = handler.flush() {
                log::error!(
                    target: "logtail_sink",
                    "handler '{}' failed to flush: {}",
                    handler.name(),
                    err
                );
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>, context: Fields) -> Result<()> {
        self.log(LogLevel::Debug, message, context)
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>, context: Fields) -> Result<()> {
        self.log(LogLevel::Info, message, context)
    }

    #[inline]
    pub fn notice(&self, message: impl Into<String>, context: Fields) -> Result<()> {
        self.log(LogLevel::Notice, message, context)
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>, context: Fields) -> Result<()> {
        self.log(LogLevel::Warning, message, context)
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>, context: Fields) -> Result<()> {
        self.log(LogLevel::Error, message, context)
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>, context: Fields) -> Result<()> {
        self.log(LogLevel::Critical, message, context)
    }

    #[inline]
    pub fn alert(&self, message: impl Into<String>, context: Fields) -> Result<()> {
        self.log(LogLevel::Alert, message, context)
    }

    #[inline]
    pub fn emergency(&self, message: impl Into<String>, context: Fields) -> Result<()> {
        self.log(LogLevel::Emergency, message, context)
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_logtail_sink::prelude::*;
    /// use std::sync::Arc;
    ///
    /// let handler = LogtailHandlerBuilder::with_source_token("token")
    ///     .with_flush_interval_millis(None)
    ///     .build_with_transport(Arc::new(MemoryTransport::new()))
    ///     .unwrap();
    ///
    /// let logger = Logger::builder("app")
    ///     .handler(Arc::new(handler))
    ///     .processor(ProcessIdProcessor)
    ///     .build();
    ///
    /// logger.info("Server started", Fields::new()).unwrap();
    /// ```
    #[must_use]
    pub fn builder(channel: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(channel)
    }
}

/// Builder for constructing a [`Logger`] with a fluent API
pub struct LoggerBuilder {
    channel: String,
    handlers: Vec<Arc<dyn Handler>>,
    processors: Vec<Box<dyn Processor>>,
}

impl LoggerBuilder {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            handlers: Vec::new(),
            processors: Vec::new(),
        }
    }

    /// Append a handler; handlers are consulted in the order added
    #[must_use = "builder methods return a new value"]
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn processor<P: Processor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            channel: self.channel,
            handlers: self.handlers,
            processors: self.processors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SinkError;
    use crate::core::fields::FieldValue;
    use parking_lot::Mutex;

    /// Records what it receives and answers with a fixed signal
    struct StubHandler {
        name: &'static str,
        threshold: LogLevel,
        stop: bool,
        seen: Mutex<Vec<LogEntry>>,
        fail_flush: bool,
    }

    impl StubHandler {
        fn new(name: &'static str, threshold: LogLevel, stop: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                threshold,
                stop,
                seen: Mutex::new(Vec::new()),
                fail_flush: false,
            })
        }

        fn seen(&self) -> usize {
            self.seen.lock().len()
        }
    }

    impl Handler for StubHandler {
        fn is_handling(&self, level: LogLevel) -> bool {
            level >= self.threshold
        }

        fn handle(&self, entry: LogEntry) -> Result<bool> {
            self.seen.lock().push(entry);
            Ok(self.stop)
        }

        fn flush(&self) -> Result<()> {
            if self.fail_flush {
                Err(SinkError::other("flush failed"))
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    #[test]
    fn test_stops_at_first_handler_returning_true() {
        let first = StubHandler::new("first", LogLevel::Debug, true);
        let second = StubHandler::new("second", LogLevel::Debug, false);

        let logger = Logger::builder("app")
            .handler(first.clone())
            .handler(second.clone())
            .build();
        logger.info("hello", Fields::new()).unwrap();

        assert_eq!(first.seen(), 1);
        assert_eq!(second.seen(), 0);
    }

    #[test]
    fn test_bubbling_handler_lets_entry_continue() {
        let first = StubHandler::new("first", LogLevel::Debug, false);
        let second = StubHandler::new("second", LogLevel::Debug, false);

        let logger = Logger::builder("app")
            .handler(first.clone())
            .handler(second.clone())
            .build();
        logger.info("hello", Fields::new()).unwrap();

        assert_eq!(first.seen(), 1);
        assert_eq!(second.seen(), 1);
    }

    #[test]
    fn test_skips_handlers_above_entry_level() {
        let strict = StubHandler::new("strict", LogLevel::Error, true);
        let lenient = StubHandler::new("lenient", LogLevel::Debug, false);

        let logger = Logger::builder("app")
            .handler(strict.clone())
            .handler(lenient.clone())
            .build();
        logger.warning("careful", Fields::new()).unwrap();

        assert_eq!(strict.seen(), 0);
        assert_eq!(lenient.seen(), 1);
        assert!(logger.is_handling(LogLevel::Debug));
    }

    #[test]
    fn test_processors_run_in_order() {
        let handler = StubHandler::new("only", LogLevel::Debug, false);
        let logger = Logger::builder("billing")
            .handler(handler.clone())
            .processor(|entry: LogEntry| entry.with_extra_field("step", 1))
            .processor(|entry: LogEntry| entry.with_extra_field("step", 2))
            .build();

        logger
            .error("charge failed", Fields::new().with_field("order", 42))
            .unwrap();

        let seen = handler.seen.lock();
        let entry = &seen[0];
        assert_eq!(entry.channel(), "billing");
        assert_eq!(entry.level(), LogLevel::Error);
        assert_eq!(entry.context().get("order"), Some(&FieldValue::Int(42)));
        assert_eq!(entry.extra().get("step"), Some(&FieldValue::Int(2)));
    }

    #[test]
    fn test_flush_reports_first_error_after_trying_all() {
        let failing = Arc::new(StubHandler {
            name: "failing",
            threshold: LogLevel::Debug,
            stop: false,
            seen: Mutex::new(Vec::new()),
            fail_flush: true,
        });
        let healthy = StubHandler::new("healthy", LogLevel::Debug, false);

        let mut logger = Logger::new("app");
        logger.push_handler(failing);
        logger.push_handler(healthy);

        assert!(logger.flush().is_err());
    }
}
