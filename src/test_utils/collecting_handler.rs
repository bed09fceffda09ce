//! A simple handler that accumulates records in memory for test assertions.

use crate::handler::{FemtoHandlerTrait, HandlerError};
use crate::level::FemtoLevel;
use crate::log_record::FemtoLogRecord;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;

/// Handler that stores every record it receives for later inspection.
///
/// Clones share the same record list.
#[derive(Clone)]
pub struct CollectingHandler {
    records: Arc<Mutex<Vec<FemtoLogRecord>>>,
    level: FemtoLevel,
    bubble: bool,
}

impl Default for CollectingHandler {
    fn default() -> Self {
        Self {
            records: Arc::default(),
            level: FemtoLevel::Trace,
            bubble: true,
        }
    }
}

impl CollectingHandler {
    /// Create a new empty handler accepting every level.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: FemtoLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_bubble(mut self, bubble: bool) -> Self {
        self.bubble = bubble;
        self
    }

    /// Return a snapshot of all records received so far.
    pub fn collected(&self) -> Vec<FemtoLogRecord> {
        self.records.lock().clone()
    }

    /// Messages of all records received so far.
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| r.message().to_owned())
            .collect()
    }
}

impl FemtoHandlerTrait for CollectingHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        self.records.lock().push(record);
        Ok(())
    }

    fn is_handling(&self, level: FemtoLevel) -> bool {
        level >= self.level
    }

    fn bubbles(&self) -> bool {
        self.bubble
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
