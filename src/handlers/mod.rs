//! Logtail handler implementations

pub mod buffer;
pub mod buffered;
pub mod builder;
pub mod synchronous;
pub mod timer;

pub use buffer::FlushEngine;
pub use buffered::LogtailHandler;
pub use builder::LogtailHandlerBuilder;
pub use synchronous::SynchronousLogtailHandler;
pub use timer::FlushTimer;
