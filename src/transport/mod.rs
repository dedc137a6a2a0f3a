//! Delivery of encoded payloads
//!
//! [`Transport`] performs one request per payload. [`Dispatcher`] wraps a
//! transport with the failure policy shared by both handler variants:
//! failures are counted, reported to the failure callback and then either
//! returned or swallowed. Nothing is ever retried.

pub mod http;
pub mod memory;

pub use http::HttpTransport;
pub use memory::MemoryTransport;

use crate::core::{FailureCallback, Result, SinkError, SinkMetrics};
use std::sync::Arc;

/// Sends one encoded payload to the ingestion endpoint
pub trait Transport: Send + Sync {
    /// Deliver `payload` in a single request; any non-2xx outcome is an error
    fn send(&self, payload: &[u8]) -> Result<()>;

    /// Destination, for diagnostics
    fn endpoint(&self) -> &str;
}

pub(crate) struct Dispatcher {
    transport: Arc<dyn Transport>,
    throw_on_failure: bool,
    on_failure: Option<FailureCallback>,
    metrics: Arc<SinkMetrics>,
}

impl Dispatcher {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        throw_on_failure: bool,
        on_failure: Option<FailureCallback>,
        metrics: Arc<SinkMetrics>,
    ) -> Self {
        Self {
            transport,
            throw_on_failure,
            on_failure,
            metrics,
        }
    }

    /// Send a payload carrying `entries` entries and apply the failure policy
    pub(crate) fn dispatch(&self, payload: &[u8], entries: usize) -> Result<()> {
        match self.send(payload, entries) {
            Ok(()) => Ok(()),
            Err(err) => self.report_failure(err, entries),
        }
    }

    /// Send and count the outcome without reporting a failure.
    ///
    /// Callers holding a lock report the error through
    /// [`Dispatcher::report_failure`] once it is released, since the
    /// callback and the `log` backend may log back into the same handler.
    pub(crate) fn send(&self, payload: &[u8], entries: usize) -> Result<()> {
        match self.transport.send(payload) {
            Ok(()) => {
                self.metrics.record_batch_sent(entries);
                Ok(())
            }
            Err(err) => {
                self.metrics.record_batch_failed(entries);
                Err(err)
            }
        }
    }

    /// Run the failure callback, then return or swallow `err`
    pub(crate) fn report_failure(&self, err: SinkError, entries: usize) -> Result<()> {
        if let Some(callback) = &self.on_failure {
            callback(&err);
        }
        if self.throw_on_failure {
            return Err(err);
        }
        log::warn!(
            target: "logtail_sink",
            "dropped {} log entries: {}",
            entries,
            err
        );
        Ok(())
    }

    pub(crate) fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }
}
