//! Core sink types and traits

pub mod config;
pub mod error;
pub mod fields;
pub mod formatter;
pub mod handler;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod processor;

pub use config::{
    DeliveryConfig, FailureCallback, FlushPolicy, HandlerConfig, DEFAULT_BUBBLE,
    DEFAULT_BUFFER_LIMIT, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_ENDPOINT, DEFAULT_FLUSH_INTERVAL,
    DEFAULT_FLUSH_ON_OVERFLOW, DEFAULT_LEVEL, DEFAULT_THROW_ON_FAILURE, DEFAULT_TIMEOUT,
};
pub use error::{Result, SinkError};
pub use fields::{ErrorInfo, FieldValue, Fields};
pub use formatter::LogtailFormatter;
pub use handler::Handler;
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::SinkMetrics;
pub use processor::{HostnameProcessor, ProcessIdProcessor, Processor, ThreadProcessor};
