//! Handler trait consumed by the host logging pipeline

use super::{error::Result, log_entry::LogEntry, log_level::LogLevel};

/// A link in the host pipeline's chain of handlers.
///
/// `handle` returns the propagation signal: `true` means the entry was
/// handled and must not be offered to the handlers after this one,
/// `false` means the pipeline should continue.
pub trait Handler: Send + Sync {
    /// Whether entries at `level` pass this handler's threshold
    fn is_handling(&self, level: LogLevel) -> bool;

    fn handle(&self, entry: LogEntry) -> Result<bool>;

    /// Handle several entries at once; handlers that can ship a batch in
    /// one request override this.
    fn handle_batch(&self, entries: Vec<LogEntry>) -> Result<()> {
        for entry in entries {
            self.handle(entry)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()>;

    fn name(&self) -> &str;
}
