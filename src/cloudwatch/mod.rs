//! CloudWatch-style batching handler.
//!
//! This module defines [`FemtoCloudWatchHandler`], a handler that formats
//! [`FemtoLogRecord`](crate::log_record::FemtoLogRecord) values, splits them
//! into provider-sized events, and writes them in batches to an append-only
//! remote log stream through a [`LogServiceClient`].
//!
//! # Provider limits
//!
//! - Events larger than [`EVENT_SIZE_LIMIT`] bytes are split into several
//!   events sharing one timestamp.
//! - A batch holds at most `batch_size` events (never more than
//!   [`BATCH_SIZE_LIMIT`]) and less than [`DATA_AMOUNT_LIMIT`] accounted
//!   bytes, where each event costs its length plus [`EVENT_OVERHEAD_BYTES`].
//! - At most [`RPS_LIMIT`] writes are issued per second; further writes
//!   block the caller.
//!
//! # Sequence tokens
//!
//! Every write after the first carries the token returned by the previous
//! one. If another writer appended in between, the service rejects the token
//! with [`LogServiceError::InvalidSequenceToken`]; the handler looks the
//! token up again and retries the same batch once. Any further failure is
//! returned to the caller and the batch is discarded.
//!
//! # Provisioning
//!
//! The first flush creates the group (with tags and retention) and the
//! stream when they are missing. Provisioning is retried on later flushes
//! until it succeeds once.

mod buffer;
mod client;
mod config;
mod event;
mod handler;
mod stream;
mod submit;


pub use client::{LogServiceClient, LogServiceError, LogStreamDescription, PutLogEvents};
pub use config::{
    BATCH_SIZE_LIMIT, CloudWatchHandlerConfig, DATA_AMOUNT_LIMIT, EVENT_OVERHEAD_BYTES,
    EVENT_SIZE_LIMIT, RPS_LIMIT,
};
pub use event::{EventChunks, LogEvent, split_message};
pub use handler::FemtoCloudWatchHandler;
pub use stream::{Phase, StreamState};
