//! Synchronous logger dispatching records to an ordered handler list.
//!
//! Handlers are visited in registration order. A handler that accepts the
//! record's level and does not bubble stops the record from reaching the
//! handlers after it.

use std::sync::Arc;

use log::warn;
use parking_lot::RwLock;

use crate::{
    handler::{FemtoHandlerTrait, HandlerError},
    level::FemtoLevel,
    log_record::FemtoLogRecord,
};

pub struct FemtoLogger {
    name: String,
    level: RwLock<FemtoLevel>,
    handlers: RwLock<Vec<Arc<dyn FemtoHandlerTrait>>>,
}

impl FemtoLogger {
    /// Create a logger named `name` that passes every level.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: RwLock::new(FemtoLevel::Trace),
            handlers: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> FemtoLevel {
        *self.level.read()
    }

    /// Update the logger's minimum level.
    pub fn set_level(&self, level: FemtoLevel) {
        *self.level.write() = level;
    }

    pub fn is_enabled_for(&self, level: FemtoLevel) -> bool {
        level >= self.level()
    }

    /// Append `handler` to the end of the dispatch order.
    pub fn add_handler(&self, handler: Arc<dyn FemtoHandlerTrait>) {
        self.handlers.write().push(handler);
    }

    /// Remove every handler, returning them in dispatch order.
    pub fn clear_handlers(&self) -> Vec<Arc<dyn FemtoHandlerTrait>> {
        std::mem::take(&mut *self.handlers.write())
    }

    /// Build a record from `message` and dispatch it.
    ///
    /// Returns `false` when the logger's level filters the record out.
    pub fn log(&self, level: FemtoLevel, message: &str) -> bool {
        if !self.is_enabled_for(level) {
            return false;
        }
        self.dispatch_record(FemtoLogRecord::new(&self.name, level, message));
        true
    }

    /// Pass `record` to each handler until one handles it without bubbling.
    ///
    /// Handler errors are logged and do not interrupt dispatch.
    pub fn dispatch_record(&self, record: FemtoLogRecord) {
        // Snapshot so handlers may block on I/O without holding the lock.
        let handlers = self.handlers.read().clone();
        for handler in handlers {
            if !handler.is_handling(record.level()) {
                continue;
            }
            if let Err(err) = handler.handle(record.clone()) {
                warn!("FemtoLogger {}: handler error: {err}", self.name);
            }
            if !handler.bubbles() {
                break;
            }
        }
    }

    /// Flush every handler, returning the first error after visiting all.
    pub fn flush(&self) -> Result<(), HandlerError> {
        self.for_each_handler(|h| h.flush())
    }

    /// Close every handler, returning the first error after visiting all.
    pub fn close(&self) -> Result<(), HandlerError> {
        self.for_each_handler(|h| h.close())
    }

    fn for_each_handler(
        &self,
        mut op: impl FnMut(&dyn FemtoHandlerTrait) -> Result<(), HandlerError>,
    ) -> Result<(), HandlerError> {
        let handlers = self.handlers.read().clone();
        let mut first_err = None;
        for handler in &handlers {
            if let Err(err) = op(handler.as_ref()) {
                warn!("FemtoLogger {}: handler error: {err}", self.name);
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for FemtoLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FemtoLogger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("handlers", &self.handlers.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::CollectingHandler;
    use rstest::rstest;

    fn logger_with(handlers: &[CollectingHandler]) -> FemtoLogger {
        let logger = FemtoLogger::new("app");
        for handler in handlers {
            logger.add_handler(Arc::new(handler.clone()));
        }
        logger
    }

    #[rstest]
    fn logger_level_filters_before_dispatch() {
        let sink = CollectingHandler::new();
        let logger = logger_with(std::slice::from_ref(&sink));
        logger.set_level(FemtoLevel::Warn);
        assert!(!logger.log(FemtoLevel::Info, "skipped"));
        assert!(logger.log(FemtoLevel::Error, "kept"));
        assert_eq!(sink.messages(), vec!["kept"]);
    }

    #[rstest]
    fn non_bubbling_handler_stops_propagation() {
        let first = CollectingHandler::new().with_bubble(false);
        let second = CollectingHandler::new();
        let logger = logger_with(&[first.clone(), second.clone()]);

        logger.log(FemtoLevel::Info, "once");

        assert_eq!(first.messages(), vec!["once"]);
        assert!(second.messages().is_empty());
    }

    #[rstest]
    fn skipped_handler_does_not_stop_propagation() {
        let strict = CollectingHandler::new()
            .with_level(FemtoLevel::Error)
            .with_bubble(false);
        let fallback = CollectingHandler::new();
        let logger = logger_with(&[strict.clone(), fallback.clone()]);

        logger.log(FemtoLevel::Info, "routine");
        logger.log(FemtoLevel::Error, "alarm");

        assert_eq!(strict.messages(), vec!["alarm"]);
        assert_eq!(fallback.messages(), vec!["routine"]);
    }

    #[rstest]
    fn clear_handlers_returns_registered_handlers() {
        let logger = logger_with(&[CollectingHandler::new(), CollectingHandler::new()]);
        assert_eq!(logger.clear_handlers().len(), 2);
        assert!(logger.clear_handlers().is_empty());
    }
}
