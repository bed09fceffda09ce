//! Public handler type exported by the crate.

use std::any::Any;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::{
    clock::SharedClock,
    formatter::SharedFormatter,
    handler::{FemtoHandlerTrait, HandlerError},
    handlers::HandlerBuildError,
    level::FemtoLevel,
    log_record::FemtoLogRecord,
    rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner},
    rate_limiter::RateLimiter,
};

use super::{
    buffer::EventBuffer,
    client::{LogServiceClient, LogServiceError},
    config::{CloudWatchHandlerConfig, RPS_LIMIT},
    event::{LogEvent, split_message},
    stream::{StreamInitializer, StreamState},
    submit::BatchSubmitter,
};

/// Mutable state owned by one handler instance.
struct HandlerState {
    client: Arc<dyn LogServiceClient>,
    buffer: EventBuffer,
    streams: StreamInitializer,
    submitter: BatchSubmitter,
    closed: bool,
}

impl HandlerState {
    /// Run remote provisioning once; later calls return immediately.
    fn ensure_ready(&mut self) -> Result<(), LogServiceError> {
        if self.streams.is_ready() {
            return Ok(());
        }
        let token = self.streams.initialize(self.client.as_ref())?;
        self.submitter.set_sequence_token(token);
        Ok(())
    }

    /// Submit `batch`, refreshing the sequence token and retrying once if
    /// the service rejects the token.
    fn submit_with_retry(&mut self, batch: &mut [LogEvent]) -> Result<(), LogServiceError> {
        match self.submitter.submit(self.client.as_ref(), batch) {
            Err(LogServiceError::InvalidSequenceToken(reason)) => {
                debug!("FemtoCloudWatchHandler: sequence token rejected ({reason}), refreshing");
                let token = self.streams.resolve_cursor(self.client.as_ref())?;
                self.submitter.set_sequence_token(token);
                self.submitter.submit(self.client.as_ref(), batch)
            }
            other => other,
        }
    }
}

/// Handler shipping records to a CloudWatch-style log stream.
///
/// Records are formatted, split into provider-sized events and buffered.
/// The buffer is submitted when the next event would reach the batch byte
/// ceiling, when it holds `batch_size` events, and on [`flush`] or
/// [`close`]. Each submission is sorted by timestamp and rate limited to
/// [`RPS_LIMIT`] requests per second; the calling thread blocks while
/// throttled.
///
/// A flush always empties the buffer. When the service rejects a batch the
/// events are discarded and the error is returned from whichever call
/// triggered the flush, which may be a later `handle` for an unrelated
/// record.
///
/// [`flush`]: FemtoHandlerTrait::flush
/// [`close`]: FemtoHandlerTrait::close
pub struct FemtoCloudWatchHandler {
    state: Mutex<HandlerState>,
    formatter: SharedFormatter,
    level: FemtoLevel,
    bubble: bool,
    warner: RateLimitedWarner,
}

impl FemtoCloudWatchHandler {
    /// Construct the handler with the default formatter and system clock.
    pub fn new(
        client: Arc<dyn LogServiceClient>,
        config: CloudWatchHandlerConfig,
    ) -> Result<Self, HandlerBuildError> {
        Self::with_parts(
            client,
            config,
            SharedFormatter::default(),
            SharedClock::default(),
        )
    }

    /// Construct the handler from validated parts.
    ///
    /// Fails before any remote call if `config` is invalid.
    pub fn with_parts(
        client: Arc<dyn LogServiceClient>,
        config: CloudWatchHandlerConfig,
        formatter: SharedFormatter,
        clock: SharedClock,
    ) -> Result<Self, HandlerBuildError> {
        config.validate()?;
        let warner = RateLimitedWarner::new(DEFAULT_WARN_INTERVAL, clock.clone());
        let limiter = RateLimiter::new(RPS_LIMIT, clock);
        let state = HandlerState {
            client,
            buffer: EventBuffer::new(config.batch_size),
            streams: StreamInitializer::new(&config),
            submitter: BatchSubmitter::new(config.group.clone(), config.stream.clone(), limiter),
            closed: false,
        };
        Ok(Self {
            state: Mutex::new(state),
            formatter,
            level: config.level,
            bubble: config.bubble,
            warner,
        })
    }

    /// Accept every handled record in `records`, then flush once.
    ///
    /// Returns the first error raised while accepting or flushing.
    pub fn handle_batch<I>(&self, records: I) -> Result<(), HandlerError>
    where
        I: IntoIterator<Item = FemtoLogRecord>,
    {
        let mut state = self.state.lock();
        if state.closed {
            return Err(reject_after_close());
        }
        let mut outcome = Ok(());
        for record in records {
            if self.is_handling(record.level()) {
                keep_first_error(&mut outcome, self.accumulate(&mut state, &record));
            }
        }
        keep_first_error(&mut outcome, self.flush_locked(&mut state));
        outcome
    }

    /// Events waiting for the next flush.
    pub fn buffered_events(&self) -> usize {
        self.state.lock().buffer.len()
    }

    /// Accounted bytes waiting for the next flush.
    pub fn buffered_bytes(&self) -> usize {
        self.state.lock().buffer.byte_total()
    }

    /// Remote provisioning progress.
    pub fn stream_state(&self) -> StreamState {
        self.state.lock().streams.state()
    }

    /// Token that will accompany the next write, if known.
    pub fn sequence_token(&self) -> Option<String> {
        self.state
            .lock()
            .submitter
            .sequence_token()
            .map(ToOwned::to_owned)
    }

    fn accumulate(
        &self,
        state: &mut HandlerState,
        record: &FemtoLogRecord,
    ) -> Result<(), HandlerError> {
        let message = self.formatter.format(record);
        let timestamp = record.metadata().timestamp_millis();
        let mut outcome = Ok(());
        for event in split_message(&message, timestamp) {
            if state.buffer.would_overflow(&event) {
                keep_first_error(&mut outcome, self.flush_locked(state));
            }
            state.buffer.push(event);
            if state.buffer.is_full() {
                keep_first_error(&mut outcome, self.flush_locked(state));
            }
        }
        outcome
    }

    fn flush_locked(&self, state: &mut HandlerState) -> Result<(), HandlerError> {
        if state.buffer.is_empty() {
            return Ok(());
        }
        let mut batch = state.buffer.take();
        let result = state
            .ensure_ready()
            .and_then(|()| state.submit_with_retry(&mut batch));
        if let Err(err) = &result {
            warn!(
                "FemtoCloudWatchHandler: failed to submit {} events: {err}",
                batch.len()
            );
            self.warner.record_drops(batch.len() as u64);
            self.warner.warn_if_due(|count| {
                warn!("FemtoCloudWatchHandler discarded {count} events after failed submissions");
            });
        }
        result.map_err(HandlerError::from)
    }
}

fn reject_after_close() -> HandlerError {
    warn!("FemtoCloudWatchHandler: record offered after close, dropping");
    HandlerError::Closed
}

/// Record `next` in `outcome` unless an earlier error is already there.
fn keep_first_error(outcome: &mut Result<(), HandlerError>, next: Result<(), HandlerError>) {
    if outcome.is_ok() {
        *outcome = next;
    }
}

impl FemtoHandlerTrait for FemtoCloudWatchHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        if !self.is_handling(record.level()) {
            return Ok(());
        }
        let mut state = self.state.lock();
        if state.closed {
            return Err(reject_after_close());
        }
        self.accumulate(&mut state, &record)
    }

    fn is_handling(&self, level: FemtoLevel) -> bool {
        level >= self.level
    }

    fn bubbles(&self) -> bool {
        self.bubble
    }

    fn flush(&self) -> Result<(), HandlerError> {
        let mut state = self.state.lock();
        self.flush_locked(&mut state)
    }

    fn close(&self) -> Result<(), HandlerError> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(());
        }
        state.closed = true;
        let result = self.flush_locked(&mut state);
        self.warner.flush(|count| {
            warn!("FemtoCloudWatchHandler discarded {count} events after failed submissions");
        });
        result
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for FemtoCloudWatchHandler {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("FemtoCloudWatchHandler: final flush failed: {err}");
        }
    }
}

impl std::fmt::Debug for FemtoCloudWatchHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FemtoCloudWatchHandler")
            .field("level", &self.level)
            .field("bubble", &self.bubble)
            .finish_non_exhaustive()
    }
}
