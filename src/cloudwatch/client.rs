//! Boundary to the remote log service.
//!
//! Transport, authentication and the wire protocol belong to the
//! implementation of [`LogServiceClient`]. Request types serialize with the
//! service's JSON field names so HTTP-based clients can send them directly.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::event::LogEvent;

/// Failures reported by a [`LogServiceClient`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LogServiceError {
    /// The sequence token presented with a write is stale or missing.
    ///
    /// Raised when another writer appended to the stream. The handler
    /// refreshes the token and retries once.
    #[error("invalid sequence token: {0}")]
    InvalidSequenceToken(String),
    /// Any other remote failure.
    #[error("{0}")]
    Service(String),
}

/// A single write of ordered events to one stream.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutLogEvents<'a> {
    #[serde(rename = "logGroupName")]
    pub group: &'a str,
    #[serde(rename = "logStreamName")]
    pub stream: &'a str,
    #[serde(rename = "logEvents")]
    pub events: &'a [LogEvent],
    /// Omitted on the first write to a new stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_token: Option<&'a str>,
}

/// Stream metadata returned by [`LogServiceClient::describe_log_streams`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogStreamDescription {
    pub name: String,
    /// Token expected by the next write, absent for streams never written.
    pub upload_sequence_token: Option<String>,
}

impl LogStreamDescription {
    pub fn new(name: impl Into<String>, upload_sequence_token: Option<String>) -> Self {
        Self {
            name: name.into(),
            upload_sequence_token,
        }
    }
}

/// Operations the handler needs from the remote log service.
///
/// Implementations must be shareable across threads; the handler serialises
/// its own calls.
pub trait LogServiceClient: Send + Sync {
    /// Append `request.events` and return the token for the next write.
    fn put_log_events(&self, request: &PutLogEvents<'_>) -> Result<Option<String>, LogServiceError>;

    /// Names of groups starting with `prefix`.
    fn describe_log_groups(&self, prefix: &str) -> Result<Vec<String>, LogServiceError>;

    fn create_log_group(
        &self,
        name: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<(), LogServiceError>;

    fn put_retention_policy(&self, group: &str, days: u32) -> Result<(), LogServiceError>;

    /// Streams in `group` whose names start with `prefix`.
    fn describe_log_streams(
        &self,
        group: &str,
        prefix: &str,
    ) -> Result<Vec<LogStreamDescription>, LogServiceError>;

    fn create_log_stream(&self, group: &str, name: &str) -> Result<(), LogServiceError>;
}
