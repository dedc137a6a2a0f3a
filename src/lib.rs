//! # Rust Logtail Sink
//!
//! A log-shipping sink that batches structured log entries and delivers
//! them to a Logtail-compatible HTTP ingestion endpoint.
//!
//! ## Features
//!
//! - **Buffered delivery**: entries are batched and flushed on overflow, on
//!   a timer, or on demand
//! - **Synchronous delivery**: one request per entry when latency matters
//!   more than throughput
//! - **Chain friendly**: level filtering and a bubbling signal for host
//!   pipelines with several handlers
//! - **Immutable builder**: share partially configured builders freely
//!
//! ## Example
//!
//! ```no_run
//! use rust_logtail_sink::prelude::*;
//! use std::sync::Arc;
//!
//! let handler = LogtailHandlerBuilder::with_source_token("source-token")
//!     .with_level(LogLevel::Info)
//!     .build()
//!     .unwrap();
//!
//! let logger = Logger::builder("app")
//!     .handler(Arc::new(handler))
//!     .processor(HostnameProcessor::new())
//!     .build();
//!
//! logger
//!     .info("User logged in", Fields::new().with_field("user_id", 42))
//!     .unwrap();
//! ```
//!
//! The sink reports its own problems (failed deliveries, overflow drops)
//! through the [`log`] facade under the `logtail_sink` target.

pub mod core;
pub mod handlers;
pub mod macros;
pub mod settings;
pub mod transport;

pub mod prelude {
    pub use crate::core::{
        ErrorInfo, FieldValue, Fields, Handler, HandlerConfig, HostnameProcessor, LogEntry,
        LogLevel, Logger, LoggerBuilder, LogtailFormatter, ProcessIdProcessor, Processor, Result,
        SinkError, SinkMetrics, ThreadProcessor,
    };
    pub use crate::handlers::{LogtailHandler, LogtailHandlerBuilder, SynchronousLogtailHandler};
    pub use crate::settings::LogtailSettings;
    pub use crate::transport::{HttpTransport, MemoryTransport, Transport};
}

pub use self::core::{
    DeliveryConfig, ErrorInfo, FailureCallback, FieldValue, Fields, FlushPolicy, Handler,
    HandlerConfig, LogEntry, LogLevel, Logger, LoggerBuilder, LogtailFormatter, Result, SinkError,
    SinkMetrics,
};
pub use handlers::{LogtailHandler, LogtailHandlerBuilder, SynchronousLogtailHandler};
pub use settings::LogtailSettings;
pub use transport::{HttpTransport, MemoryTransport, Transport};
