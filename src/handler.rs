use std::any::Any;

use thiserror::Error;

use crate::cloudwatch::LogServiceError;
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;

/// Errors surfaced by handlers while accepting or flushing records.
///
/// Flushes may be triggered by an unrelated later record, so a `Service`
/// error returned from `handle` can describe a batch that was buffered
/// earlier.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The remote service rejected a batch. The batch has been discarded.
    #[error("log service error: {0}")]
    Service(#[from] LogServiceError),
    /// The handler has been closed and no longer accepts records.
    #[error("handler is closed")]
    Closed,
}

/// Trait implemented by all log handlers.
///
/// Handlers are `Send + Sync` so a logger can share them across threads.
/// Implementations serialise their own mutable state.
pub trait FemtoHandlerTrait: Send + Sync {
    /// Dispatch a log record for handling.
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError>;

    /// Whether records at `level` are accepted by this handler.
    fn is_handling(&self, _level: FemtoLevel) -> bool {
        true
    }

    /// Whether a handled record should continue on to later handlers.
    fn bubbles(&self) -> bool {
        true
    }

    /// Push any buffered records to their destination.
    fn flush(&self) -> Result<(), HandlerError> {
        Ok(())
    }

    /// Flush and release resources. Later records are rejected.
    fn close(&self) -> Result<(), HandlerError> {
        self.flush()
    }

    /// Downcast hook used by tests and registries.
    fn as_any(&self) -> &dyn Any;
}
