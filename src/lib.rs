//! Batched, rate-limited log shipping to a CloudWatch-style log service.
//!
//! Records flow from a [`FemtoLogger`] (or the `log` crate through
//! [`log_compat`]) into a [`FemtoCloudWatchHandler`], which formats them,
//! splits oversized messages, batches events within the provider's limits,
//! and writes them through a [`LogServiceClient`] while tracking the
//! stream's sequence token.
//!
//! The transport is supplied by the caller; this crate only defines the
//! [`LogServiceClient`] boundary.

pub mod clock;
pub mod cloudwatch;
pub mod formatter;
pub mod handler;
pub mod handlers;
pub mod level;
#[cfg(feature = "log-compat")]
pub mod log_compat;
pub mod log_record;
pub mod logger;
pub mod rate_limited_warner;
pub mod rate_limiter;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use clock::{Clock, SharedClock, SystemClock};
pub use cloudwatch::{
    BATCH_SIZE_LIMIT, CloudWatchHandlerConfig, DATA_AMOUNT_LIMIT, EVENT_OVERHEAD_BYTES,
    EVENT_SIZE_LIMIT, FemtoCloudWatchHandler, LogEvent, LogServiceClient, LogServiceError,
    LogStreamDescription, Phase, PutLogEvents, RPS_LIMIT, StreamState, split_message,
};
pub use formatter::{DefaultFormatter, FemtoFormatter, JsonFormatter, SharedFormatter};
pub use handler::{FemtoHandlerTrait, HandlerError};
pub use handlers::{CloudWatchHandlerBuilder, HandlerBuildError, HandlerBuilderTrait};
pub use level::{FemtoLevel, ParseLevelError};
#[cfg(feature = "log-compat")]
pub use log_compat::FemtoLogAdapter;
pub use log_record::{FemtoLogRecord, RecordMetadata};
pub use logger::FemtoLogger;
pub use rate_limiter::RateLimiter;
