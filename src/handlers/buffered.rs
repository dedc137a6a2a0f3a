//! Buffered Logtail handler

use super::buffer::FlushEngine;
use super::timer::FlushTimer;
use crate::core::{Handler, HandlerConfig, LogEntry, LogLevel, Result, SinkMetrics};
use crate::transport::{Dispatcher, HttpTransport, Transport};
use parking_lot::Mutex;
use std::sync::Arc;

/// Handler that batches entries and ships them to Logtail
///
/// Entries accumulate until the buffer fills, the flush timer fires, or
/// [`LogtailHandler::flush`] is called. Dropping the handler flushes what is
/// left and stops the timer.
///
/// # Example
///
/// ```
/// use rust_logtail_sink::prelude::*;
/// use std::sync::Arc;
///
/// let transport = Arc::new(MemoryTransport::new());
/// let handler = LogtailHandlerBuilder::with_source_token("token")
///     .with_buffer_limit(2)
///     .with_flush_interval_millis(None)
///     .build_with_transport(transport.clone())
///     .unwrap();
///
/// handler.handle(LogEntry::new(LogLevel::Info, "app", "one")).unwrap();
/// handler.handle(LogEntry::new(LogLevel::Info, "app", "two")).unwrap();
///
/// assert_eq!(transport.call_count(), 1);
/// ```
pub struct LogtailHandler {
    level: LogLevel,
    bubble: bool,
    engine: Arc<FlushEngine>,
    timer: Mutex<Option<FlushTimer>>,
    metrics: Arc<SinkMetrics>,
}

impl LogtailHandler {
    /// Create a handler that delivers over HTTP
    pub fn with_config(config: HandlerConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config.delivery));
        Self::with_transport(config, transport)
    }

    /// Create a handler that delivers through `transport`
    pub fn with_transport(config: HandlerConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::new(SinkMetrics::new());
        let dispatcher = Dispatcher::new(
            transport,
            config.delivery.throw_on_failure,
            config.on_failure.clone(),
            Arc::clone(&metrics),
        );
        let engine = Arc::new(FlushEngine::new(&config.flush, dispatcher));

        let timer = match config.flush.flush_interval {
            Some(interval) => Some(FlushTimer::start(Arc::clone(&engine), interval)?),
            None => None,
        };

        Ok(Self {
            level: config.level,
            bubble: config.bubble,
            engine,
            timer: Mutex::new(timer),
            metrics,
        })
    }

    /// Offer an entry; `true` means later handlers must not see it
    pub fn handle(&self, entry: LogEntry) -> Result<bool> {
        if !self.is_handling(entry.level()) {
            self.metrics.record_filtered();
            return Ok(false);
        }

        let accepted = self.engine.append(entry)?;
        Ok(accepted && !self.bubble)
    }

    pub fn is_handling(&self, level: LogLevel) -> bool {
        level.is_at_least(self.level)
    }

    /// Send everything buffered so far
    pub fn flush(&self) -> Result<()> {
        self.engine.flush()
    }

    /// Flush what is left and stop the timer
    ///
    /// The handler keeps accepting entries afterwards; they are sent on the
    /// next explicit flush, on overflow, or when the handler is dropped.
    pub fn close(&self) -> Result<()> {
        let result = self.engine.flush();
        if let Some(mut timer) = self.timer.lock().take() {
            timer.stop();
        }
        result
    }

    /// Entries waiting in the buffer
    pub fn buffered_len(&self) -> usize {
        self.engine.len()
    }

    pub fn has_timer(&self) -> bool {
        self.timer.lock().is_some()
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn bubble(&self) -> bool {
        self.bubble
    }

    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }
}

impl Handler for LogtailHandler {
    fn is_handling(&self, level: LogLevel) -> bool {
        LogtailHandler::is_handling(self, level)
    }

    fn handle(&self, entry: LogEntry) -> Result<bool> {
        LogtailHandler::handle(self, entry)
    }

    fn flush(&self) -> Result<()> {
        LogtailHandler::flush(self)
    }

    fn name(&self) -> &str {
        "logtail"
    }
}

impl std::fmt::Debug for LogtailHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogtailHandler")
            .field("level", &self.level)
            .field("bubble", &self.bubble)
            .field("engine", &self.engine)
            .finish()
    }
}

impl Drop for LogtailHandler {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::error!(
                target: "logtail_sink",
                "final flush failed while closing handler: {}",
                err
            );
        }
    }
}
