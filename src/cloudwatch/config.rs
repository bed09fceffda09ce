//! Provider limits and the configuration consumed by the CloudWatch handler.
//!
//! `CloudWatchHandlerBuilder` constructs and validates these values before
//! passing them to [`FemtoCloudWatchHandler`](super::FemtoCloudWatchHandler).

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::handlers::HandlerBuildError;
use crate::level::FemtoLevel;

/// Requests per second accepted by the service for one stream.
pub const RPS_LIMIT: u32 = 5;
/// Largest message, in bytes, accepted for a single event.
pub const EVENT_SIZE_LIMIT: usize = 262_118;
/// Largest accounted size, in bytes, of one batch.
pub const DATA_AMOUNT_LIMIT: usize = 1_048_576;
/// Largest number of events accepted in one batch.
pub const BATCH_SIZE_LIMIT: usize = 10_000;
/// Fixed per-event overhead added to the message length when sizing a batch.
pub const EVENT_OVERHEAD_BYTES: usize = 26;

/// Configuration object describing how to construct a
/// [`FemtoCloudWatchHandler`](super::FemtoCloudWatchHandler).
///
/// Deserializes from any serde format; omitted fields take their defaults.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CloudWatchHandlerConfig {
    /// Log group receiving the events.
    pub group: String,
    /// Log stream within `group`.
    pub stream: String,
    /// Retention applied when the group is created. Zero leaves the
    /// service default in place.
    pub retention_days: u32,
    /// Events per batch, at most [`BATCH_SIZE_LIMIT`].
    pub batch_size: usize,
    /// Tags attached when the group is created.
    pub tags: BTreeMap<String, String>,
    /// Minimum level handled.
    pub level: FemtoLevel,
    /// Whether handled records continue to later handlers.
    pub bubble: bool,
    /// Create the group when it does not exist yet.
    pub create_group: bool,
}

impl Default for CloudWatchHandlerConfig {
    fn default() -> Self {
        Self {
            group: String::new(),
            stream: String::new(),
            retention_days: 0,
            batch_size: BATCH_SIZE_LIMIT,
            tags: BTreeMap::new(),
            level: FemtoLevel::default(),
            bubble: true,
            create_group: true,
        }
    }
}

impl CloudWatchHandlerConfig {
    /// Check the configuration against provider limits.
    pub fn validate(&self) -> Result<(), HandlerBuildError> {
        if self.group.trim().is_empty() {
            return Err(HandlerBuildError::InvalidConfig(
                "log group name must not be empty".into(),
            ));
        }
        if self.stream.trim().is_empty() {
            return Err(HandlerBuildError::InvalidConfig(
                "log stream name must not be empty".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(HandlerBuildError::InvalidConfig(
                "batch_size must be greater than zero".into(),
            ));
        }
        if self.batch_size > BATCH_SIZE_LIMIT {
            return Err(HandlerBuildError::InvalidConfig(format!(
                "batch_size must not exceed {BATCH_SIZE_LIMIT}, got {}",
                self.batch_size
            )));
        }
        Ok(())
    }
}
