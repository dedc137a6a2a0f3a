//! Processors that enrich an entry's `extra` before it reaches handlers

use super::log_entry::LogEntry;
use std::cell::RefCell;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Transforms an entry before it is dispatched; typically adds `extra`
/// fields.
pub trait Processor: Send + Sync {
    fn process(&self, entry: LogEntry) -> LogEntry;
}

impl<F> Processor for F
where
    F: Fn(LogEntry) -> LogEntry + Send + Sync,
{
    fn process(&self, entry: LogEntry) -> LogEntry {
        self(entry)
    }
}

/// Adds `extra.hostname`
#[derive(Debug, Clone)]
pub struct HostnameProcessor {
    hostname: String,
}

impl HostnameProcessor {
    /// Resolve the hostname once; unresolvable names become `"unknown"`
    pub fn new() -> Self {
        let hostname = hostname::get()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());
        Self { hostname }
    }

    pub fn with_hostname(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }
}

impl Default for HostnameProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for HostnameProcessor {
    fn process(&self, entry: LogEntry) -> LogEntry {
        entry.with_extra_field("hostname", self.hostname.as_str())
    }
}

/// Adds `extra.process_id`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessIdProcessor;

impl Processor for ProcessIdProcessor {
    fn process(&self, entry: LogEntry) -> LogEntry {
        entry.with_extra_field("process_id", std::process::id())
    }
}

/// Adds `extra.thread_id` and, for named threads, `extra.thread_name`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadProcessor;

impl Processor for ThreadProcessor {
    fn process(&self, entry: LogEntry) -> LogEntry {
        let entry = entry.with_extra_field("thread_id", current_thread_id());
        match current_thread_name() {
            Some(name) => entry.with_extra_field("thread_name", name),
            None => entry,
        }
    }
}
