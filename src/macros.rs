//! Logging macros for ergonomic log message formatting.
//!
//! The level macros format their message like `format!` and forward it to
//! [`Logger::log`](crate::core::Logger::log). An optional `{ key => value }`
//! block before the message becomes the entry's context. Every macro
//! evaluates to the `Result` returned by the logger.
//!
//! # Examples
//!
//! ```
//! use rust_logtail_sink::prelude::*;
//! use rust_logtail_sink::{info, error};
//! use std::sync::Arc;
//!
//! let transport = Arc::new(MemoryTransport::new());
//! let handler = LogtailHandlerBuilder::with_source_token("token")
//!     .with_flush_interval_millis(None)
//!     .build_synchronous_with_transport(transport.clone())
//!     .unwrap();
//! let logger = Logger::builder("app").handler(Arc::new(handler)).build();
//!
//! // Basic logging
//! info!(logger, "Server started").unwrap();
//!
//! // With format arguments and context
//! let port = 8080;
//! error!(logger, { "port" => port, "retryable" => false }, "Bind to {} failed", port).unwrap();
//!
//! assert_eq!(transport.call_count(), 2);
//! ```

/// Build a [`Fields`](crate::core::Fields) map.
///
/// # Examples
///
/// ```
/// use rust_logtail_sink::fields;
///
/// let context = fields! { "user" => "alice", "attempt" => 3 };
/// assert_eq!(context.len(), 2);
/// assert!(fields!().is_empty());
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::core::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::core::Fields::new();
        $(
            fields.insert($key, $value);
        )+
        fields
    }};
}

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_logtail_sink::prelude::*;
/// # let logger = Logger::new("app");
/// use rust_logtail_sink::log;
/// log!(logger, LogLevel::Info, "Simple message").unwrap();
/// log!(logger, LogLevel::Error, "Error code: {}", 500).unwrap();
/// log!(logger, LogLevel::Error, { "code" => 500 }, "Request failed").unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, { $($context:tt)* }, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), $crate::fields!($($context)*))
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), $crate::core::Fields::new())
    };
}

/// Log a debug-level message.
///
/// ```
/// # use rust_logtail_sink::prelude::*;
/// # let logger = Logger::new("app");
/// use rust_logtail_sink::debug;
/// debug!(logger, "Counter value: {}", 10).unwrap();
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, { $($context:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, { $($context)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, { $($context:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, { $($context)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a notice-level message.
#[macro_export]
macro_rules! notice {
    ($logger:expr, { $($context:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Notice, { $($context)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Notice, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```
/// # use rust_logtail_sink::prelude::*;
/// # let logger = Logger::new("app");
/// use rust_logtail_sink::warning;
/// warning!(logger, "Retry attempt {} of {}", 3, 5).unwrap();
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, { $($context:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, { $($context)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, { $($context:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, { $($context)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, { $($context:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, { $($context)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

/// Log an alert-level message.
#[macro_export]
macro_rules! alert {
    ($logger:expr, { $($context:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Alert, { $($context)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Alert, $($arg)+)
    };
}

/// Log an emergency-level message.
///
/// ```
/// # use rust_logtail_sink::prelude::*;
/// # let logger = Logger::new("app");
/// use rust_logtail_sink::emergency;
/// emergency!(logger, "Unable to recover from error: {}", "disk full").unwrap();
/// ```
#[macro_export]
macro_rules! emergency {
    ($logger:expr, { $($context:tt)* }, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Emergency, { $($context)* }, $($arg)+)
    };
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Emergency, $($arg)+)
    };
}
