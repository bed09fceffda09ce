//! Provider-sized log events and the splitter producing them.

use serde::Serialize;

use super::config::{EVENT_OVERHEAD_BYTES, EVENT_SIZE_LIMIT};

/// One event as submitted to the service.
///
/// The message never exceeds [`EVENT_SIZE_LIMIT`] bytes. Events are only
/// created by [`split_message`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    timestamp: i64,
    message: String,
}

impl LogEvent {
    pub(crate) fn new(message: String, timestamp: i64) -> Self {
        debug_assert!(message.len() <= EVENT_SIZE_LIMIT);
        Self { timestamp, message }
    }

    /// Milliseconds since the UNIX epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Bytes counted against the batch size limit.
    pub fn accounted_size(&self) -> usize {
        self.message.len() + EVENT_OVERHEAD_BYTES
    }
}

/// Lazy iterator over the provider-sized chunks of one message.
///
/// Cloning the iterator restarts it from the clone's position.
#[derive(Clone, Debug)]
pub struct EventChunks<'a> {
    rest: &'a str,
    timestamp: i64,
}

impl Iterator for EventChunks<'_> {
    type Item = LogEvent;

    fn next(&mut self) -> Option<LogEvent> {
        if self.rest.is_empty() {
            return None;
        }
        let mut end = self.rest.len().min(EVENT_SIZE_LIMIT);
        // Never cut a code point in half.
        while !self.rest.is_char_boundary(end) {
            end -= 1;
        }
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(LogEvent::new(chunk.to_owned(), self.timestamp))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.rest.len();
        // A chunk holds at least EVENT_SIZE_LIMIT - 3 bytes unless it is the last.
        let upper = len.div_ceil(EVENT_SIZE_LIMIT - 3);
        (len.div_ceil(EVENT_SIZE_LIMIT), Some(upper))
    }
}

/// Split `message` into events of at most [`EVENT_SIZE_LIMIT`] bytes.
///
/// All chunks share `timestamp` and concatenate back to `message`. An empty
/// message yields no events.
pub fn split_message(message: &str, timestamp: i64) -> EventChunks<'_> {
    EventChunks {
        rest: message,
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_message_yields_nothing() {
        assert_eq!(split_message("", 5).count(), 0);
    }

    #[test]
    fn short_message_is_one_event() {
        let events: Vec<_> = split_message("hello", 42).collect();
        assert_eq!(events, vec![LogEvent::new("hello".into(), 42)]);
        assert_eq!(events[0].accounted_size(), 5 + EVENT_OVERHEAD_BYTES);
    }

    #[rstest]
    #[case(EVENT_SIZE_LIMIT, 1)]
    #[case(EVENT_SIZE_LIMIT + 1, 2)]
    #[case(EVENT_SIZE_LIMIT * 3, 3)]
    #[case(EVENT_SIZE_LIMIT * 3 + 7, 4)]
    fn ascii_splits_into_ceil_chunks(#[case] len: usize, #[case] expected: usize) {
        let message = "x".repeat(len);
        let events: Vec<_> = split_message(&message, 9).collect();
        assert_eq!(events.len(), expected);
        assert!(events.iter().all(|e| e.message().len() <= EVENT_SIZE_LIMIT));
        assert!(events.iter().all(|e| e.timestamp() == 9));
        let joined: String = events.iter().map(LogEvent::message).collect();
        assert_eq!(joined, message);
    }

    #[test]
    fn chunks_end_on_char_boundaries() {
        // 'é' is two bytes; an odd prefix pushes a boundary into a code point.
        let message = format!("a{}", "é".repeat(EVENT_SIZE_LIMIT));
        let events: Vec<_> = split_message(&message, 0).collect();
        assert!(events.iter().all(|e| e.message().len() <= EVENT_SIZE_LIMIT));
        let joined: String = events.iter().map(LogEvent::message).collect();
        assert_eq!(joined, message);
    }

    #[test]
    fn cloned_iterator_restarts_from_same_position() {
        let message = "y".repeat(EVENT_SIZE_LIMIT + 10);
        let mut chunks = split_message(&message, 1);
        let replay = chunks.clone();
        let first = chunks.next().expect("first chunk");
        assert_eq!(replay.clone().next(), Some(first));
        assert_eq!(replay.count(), 2);
    }
}
