//! Unbuffered Logtail handler

use crate::core::{
    Handler, HandlerConfig, LogEntry, LogLevel, LogtailFormatter, Result, SinkMetrics,
};
use crate::transport::{Dispatcher, HttpTransport, Transport};
use std::sync::Arc;

/// Handler that sends every accepted entry in its own request
///
/// The caller blocks for the duration of the request. Batches passed to
/// [`Handler::handle_batch`] go out as a single request.
pub struct SynchronousLogtailHandler {
    level: LogLevel,
    bubble: bool,
    formatter: LogtailFormatter,
    dispatcher: Dispatcher,
    metrics: Arc<SinkMetrics>,
}

impl SynchronousLogtailHandler {
    pub fn with_config(config: HandlerConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config.delivery));
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: HandlerConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::new(SinkMetrics::new());
        let dispatcher = Dispatcher::new(
            transport,
            config.delivery.throw_on_failure,
            config.on_failure.clone(),
            Arc::clone(&metrics),
        );

        Ok(Self {
            level: config.level,
            bubble: config.bubble,
            formatter: LogtailFormatter::new(),
            dispatcher,
            metrics,
        })
    }

    pub fn handle(&self, entry: LogEntry) -> Result<bool> {
        if !self.is_handling(entry.level()) {
            self.metrics.record_filtered();
            return Ok(false);
        }

        self.metrics.record_accepted();
        let payload = self.formatter.encode(&entry);
        self.dispatcher.dispatch(&payload, 1)?;
        Ok(!self.bubble)
    }

    /// Send the entries that pass the level filter as one batch
    pub fn handle_batch(&self, entries: Vec<LogEntry>) -> Result<()> {
        let mut accepted = Vec::with_capacity(entries.len());
        for entry in entries {
            if self.is_handling(entry.level()) {
                self.metrics.record_accepted();
                accepted.push(entry);
            } else {
                self.metrics.record_filtered();
            }
        }
        if accepted.is_empty() {
            return Ok(());
        }

        let payload = self.formatter.encode_batch(&accepted);
        self.dispatcher.dispatch(&payload, accepted.len())
    }

    pub fn is_handling(&self, level: LogLevel) -> bool {
        level.is_at_least(self.level)
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

impl Handler for SynchronousLogtailHandler {
    fn is_handling(&self, level: LogLevel) -> bool {
        SynchronousLogtailHandler::is_handling(self, level)
    }

    fn handle(&self, entry: LogEntry) -> Result<bool> {
        SynchronousLogtailHandler::handle(self, entry)
    }

    fn handle_batch(&self, entries: Vec<LogEntry>) -> Result<()> {
        SynchronousLogtailHandler::handle_batch(self, entries)
    }

    /// Nothing is ever held back
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "logtail_sync"
    }
}

impl std::fmt::Debug for SynchronousLogtailHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynchronousLogtailHandler")
            .field("level", &self.level)
            .field("bubble", &self.bubble)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    fn handler(
        transport: Arc<MemoryTransport>,
        level: LogLevel,
        bubble: bool,
    ) -> SynchronousLogtailHandler {
        let mut config = HandlerConfig::new("token");
        config.level = level;
        config.bubble = bubble;
        SynchronousLogtailHandler::with_transport(config, transport).unwrap()
    }

    #[test]
    fn test_each_entry_is_sent_as_an_object() {
        let transport = Arc::new(MemoryTransport::new());
        let handler = handler(transport.clone(), LogLevel::Debug, true);

        assert!(!handler.handle(LogEntry::new(LogLevel::Info, "app", "one")).unwrap());
        assert!(!handler.handle(LogEntry::new(LogLevel::Info, "app", "two")).unwrap());

        assert_eq!(transport.call_count(), 2);
        let payloads = transport.json_payloads();
        assert!(payloads[0].is_object());
        assert_eq!(payloads[1]["message"], "two");
    }

    #[test]
    fn test_non_bubbling_handler_stops_propagation() {
        let transport = Arc::new(MemoryTransport::new());
        let handler = handler(transport, LogLevel::Debug, false);

        assert!(handler.handle(LogEntry::new(LogLevel::Error, "app", "stop")).unwrap());
    }

    #[test]
    fn test_filtered_entry_sends_nothing() {
        let transport = Arc::new(MemoryTransport::new());
        let handler = handler(transport.clone(), LogLevel::Error, false);

        assert!(!handler.handle(LogEntry::new(LogLevel::Warning, "app", "quiet")).unwrap());
        assert_eq!(transport.call_count(), 0);
        assert_eq!(handler.metrics().entries_filtered(), 1);
    }

    #[test]
    fn test_batch_filters_then_sends_once() {
        let transport = Arc::new(MemoryTransport::new());
        let handler = handler(transport.clone(), LogLevel::Warning, true);

        handler
            .handle_batch(vec![
                LogEntry::new(LogLevel::Info, "app", "skip"),
                LogEntry::new(LogLevel::Warning, "app", "keep 1"),
                LogEntry::new(LogLevel::Critical, "app", "keep 2"),
            ])
            .unwrap();

        assert_eq!(transport.call_count(), 1);
        assert!(transport.json_payloads()[0].is_array());
        assert_eq!(transport.messages(), vec!["keep 1", "keep 2"]);
        assert_eq!(handler.metrics().entries_filtered(), 1);
        assert_eq!(handler.metrics().entries_accepted(), 2);
        assert_eq!(handler.metrics().entries_delivered(), 2);
    }

    #[test]
    fn test_batch_with_no_survivors_sends_nothing() {
        let transport = Arc::new(MemoryTransport::new());
        let handler = handler(transport.clone(), LogLevel::Error, true);

        handler
            .handle_batch(vec![LogEntry::new(LogLevel::Debug, "app", "skip")])
            .unwrap();
        handler.handle_batch(Vec::new()).unwrap();

        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_failure_surfaces_when_throwing() {
        let transport = Arc::new(MemoryTransport::failing_with(500));
        let mut config = HandlerConfig::new("token");
        config.delivery.throw_on_failure = true;
        let handler = SynchronousLogtailHandler::with_transport(config, transport).unwrap();

        let err = handler
            .handle(LogEntry::new(LogLevel::Error, "app", "boom"))
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
