//! In-memory batch awaiting submission.

use std::mem;

use super::config::DATA_AMOUNT_LIMIT;
use super::event::LogEvent;

/// Events accepted since the last flush together with their accounted size.
#[derive(Debug)]
pub(crate) struct EventBuffer {
    events: Vec<LogEvent>,
    byte_total: usize,
    batch_size: usize,
}

impl EventBuffer {
    pub(crate) fn new(batch_size: usize) -> Self {
        Self {
            events: Vec::new(),
            byte_total: 0,
            batch_size,
        }
    }

    /// Whether appending `event` would reach the batch byte ceiling.
    pub(crate) fn would_overflow(&self, event: &LogEvent) -> bool {
        self.byte_total + event.accounted_size() >= DATA_AMOUNT_LIMIT
    }

    pub(crate) fn push(&mut self, event: LogEvent) {
        self.byte_total += event.accounted_size();
        self.events.push(event);
    }

    /// Whether the event count has reached the configured batch size.
    pub(crate) fn is_full(&self) -> bool {
        self.events.len() >= self.batch_size
    }

    /// Remove and return every buffered event, resetting the byte total.
    pub(crate) fn take(&mut self) -> Vec<LogEvent> {
        self.byte_total = 0;
        mem::take(&mut self.events)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn byte_total(&self) -> usize {
        self.byte_total
    }
}
