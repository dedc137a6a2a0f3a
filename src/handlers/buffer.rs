//! Bounded entry buffer and the flush machinery behind it
//!
//! Entries are appended under a short lock. A flush seals the current
//! buffer into a queue of batches and then drains that queue under a
//! second lock. Encoding and network calls therefore never block callers
//! adding entries, and at most one request is in flight per engine.

use crate::core::{FlushPolicy, LogEntry, LogtailFormatter, Result, SinkMetrics};
use crate::transport::Dispatcher;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::mem;

/// Overflow drops are reported on the first drop and then once per this many
const DROP_WARNING_INTERVAL: u64 = 1000;

#[derive(Debug, Default)]
struct BufferState {
    entries: Vec<LogEntry>,
    /// Snapshots waiting to be sent, oldest first
    sealed: VecDeque<Vec<LogEntry>>,
}

impl BufferState {
    fn seal(&mut self) {
        if !self.entries.is_empty() {
            self.sealed.push_back(mem::take(&mut self.entries));
        }
    }
}

/// Ordered buffer of pending entries with size and explicit flush triggers
pub struct FlushEngine {
    state: Mutex<BufferState>,
    flush_lock: Mutex<()>,
    buffer_limit: usize,
    flush_on_overflow: bool,
    formatter: LogtailFormatter,
    dispatcher: Dispatcher,
}

impl FlushEngine {
    pub(crate) fn new(policy: &FlushPolicy, dispatcher: Dispatcher) -> Self {
        Self {
            state: Mutex::new(BufferState {
                entries: Vec::with_capacity(policy.buffer_limit.min(1024)),
                sealed: VecDeque::new(),
            }),
            flush_lock: Mutex::new(()),
            buffer_limit: policy.buffer_limit,
            flush_on_overflow: policy.flush_on_overflow,
            formatter: LogtailFormatter::new(),
            dispatcher,
        }
    }

    /// Buffer an entry.
    ///
    /// Returns `Ok(false)` when the buffer was full and the entry dropped.
    /// When the entry fills the buffer and overflow flushing is on, the
    /// buffer is flushed before returning; a delivery error from that flush
    /// is returned only if the dispatcher surfaces failures.
    pub fn append(&self, entry: LogEntry) -> Result<bool> {
        let sealed = {
            let mut state = self.state.lock();
            if state.entries.len() >= self.buffer_limit {
                drop(state);
                self.record_overflow();
                return Ok(false);
            }

            state.entries.push(entry);
            self.metrics().record_accepted();

            if self.flush_on_overflow && state.entries.len() >= self.buffer_limit {
                state.seal();
                true
            } else {
                false
            }
        };

        if sealed {
            self.drain()?;
        }
        Ok(true)
    }

    /// Send everything buffered so far; a no-op on an empty buffer
    pub fn flush(&self) -> Result<()> {
        self.state.lock().seal();
        self.drain()
    }

    /// Entries waiting in the open buffer
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sealed batches not yet sent
    pub fn pending_batches(&self) -> usize {
        self.state.lock().sealed.len()
    }

    pub fn buffer_limit(&self) -> usize {
        self.buffer_limit
    }

    pub fn metrics(&self) -> &SinkMetrics {
        self.dispatcher.metrics()
    }

    fn drain(&self) -> Result<()> {
        loop {
            // Failures are reported with the flush lock released; the
            // callback may append to and flush this engine.
            let (err, entries) = {
                let _in_flight = self.flush_lock.lock();
                loop {
                    let next = self.state.lock().sealed.pop_front();
                    let Some(batch) = next else {
                        return Ok(());
                    };

                    let payload = self.formatter.encode_batch(&batch);
                    if let Err(err) = self.dispatcher.send(&payload, batch.len()) {
                        break (err, batch.len());
                    }
                }
            };
            self.dispatcher.report_failure(err, entries)?;
        }
    }

    fn record_overflow(&self) {
        let previous = self.metrics().record_dropped();
        if previous == 0 || (previous + 1) % DROP_WARNING_INTERVAL == 0 {
            log::warn!(
                target: "logtail_sink",
                "buffer full ({} entries), {} entries dropped so far; \
                 enable flush_on_overflow or raise the buffer limit",
                self.buffer_limit,
                previous + 1
            );
        }
    }
}

impl std::fmt::Debug for FlushEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushEngine")
            .field("buffered", &self.len())
            .field("buffer_limit", &self.buffer_limit)
            .field("flush_on_overflow", &self.flush_on_overflow)
            .finish()
    }
}
