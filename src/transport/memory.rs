//! In-memory transport
//!
//! Keeps every payload it is given. It can be switched into a failing mode
//! or made slow, which makes it the transport of choice for exercising the
//! flush machinery without a network.

use super::Transport;
use crate::core::{Result, SinkError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const MEMORY_ENDPOINT: &str = "memory://";

/// Transport that records payloads instead of sending them
///
/// # Example
///
/// ```
/// use rust_logtail_sink::transport::{MemoryTransport, Transport};
///
/// let transport = MemoryTransport::new();
/// transport.send(br#"[{"message":"hello"}]"#).unwrap();
///
/// assert_eq!(transport.call_count(), 1);
/// assert_eq!(transport.messages(), vec!["hello".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryTransport {
    payloads: Mutex<Vec<Vec<u8>>>,
    calls: AtomicU64,
    failure_status: Mutex<Option<u16>>,
    delay: Option<Duration>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `status` until [`MemoryTransport::set_failure`]
    /// clears it
    pub fn failing_with(status: u16) -> Self {
        let transport = Self::new();
        transport.set_failure(Some(status));
        transport
    }

    /// Sleep for `delay` inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failure(&self, status: Option<u16>) {
        *self.failure_status.lock() = status;
    }

    /// Number of `send` calls, failed ones included
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Payloads of the successful calls, in call order
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.payloads.lock().clone()
    }

    /// Successful payloads parsed back into JSON
    pub fn json_payloads(&self) -> Vec<serde_json::Value> {
        self.payloads
            .lock()
            .iter()
            .filter_map(|payload| serde_json::from_slice(payload).ok())
            .collect()
    }

    /// `message` of every delivered entry, flattened across payloads
    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for payload in self.json_payloads() {
            let records = match payload {
                serde_json::Value::Array(records) => records,
                record => vec![record],
            };
            messages.extend(
                records
                    .iter()
                    .filter_map(|record| record.get("message")?.as_str().map(String::from)),
            );
        }
        messages
    }

    pub fn clear(&self) {
        self.payloads.lock().clear();
        self.calls.store(0, Ordering::Relaxed);
    }
}

impl Transport for MemoryTransport {
    fn send(&self, payload: &[u8]) -> Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        if let Some(status) = *self.failure_status.lock() {
            return Err(SinkError::http_status(
                MEMORY_ENDPOINT,
                status,
                "configured failure",
            ));
        }

        self.payloads.lock().push(payload.to_vec());
        Ok(())
    }

    fn endpoint(&self) -> &str {
        MEMORY_ENDPOINT
    }
}
