//! Remote group/stream provisioning and sequence token discovery.

use std::collections::BTreeMap;

use log::debug;

use super::client::{LogServiceClient, LogServiceError};
use super::config::CloudWatchHandlerConfig;

/// Whether remote provisioning has completed for this handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Uninitialized,
    Ready,
}

/// What the handler has learned about the remote group and stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamState {
    pub group_exists: bool,
    pub stream_exists: bool,
    pub phase: Phase,
}

/// Ensures the target group and stream exist and finds the upload token.
///
/// Remote failures are returned unchanged. The phase only moves to
/// [`Phase::Ready`] after group and stream resolution both succeed, so a
/// failed initialization is attempted again on the next flush.
#[derive(Debug)]
pub(crate) struct StreamInitializer {
    group: String,
    stream: String,
    retention_days: u32,
    tags: BTreeMap<String, String>,
    create_group: bool,
    state: StreamState,
}

impl StreamInitializer {
    pub(crate) fn new(config: &CloudWatchHandlerConfig) -> Self {
        Self {
            group: config.group.clone(),
            stream: config.stream.clone(),
            retention_days: config.retention_days,
            tags: config.tags.clone(),
            create_group: config.create_group,
            state: StreamState::default(),
        }
    }

    pub(crate) fn state(&self) -> StreamState {
        self.state
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.state.phase == Phase::Ready
    }

    /// Provision group and stream, returning the stream's current token.
    pub(crate) fn initialize(
        &mut self,
        client: &dyn LogServiceClient,
    ) -> Result<Option<String>, LogServiceError> {
        if self.create_group {
            self.ensure_group(client)?;
        }
        let token = self.resolve_cursor(client)?;
        self.state.phase = Phase::Ready;
        debug!(
            "FemtoCloudWatchHandler: stream {}/{} ready",
            self.group, self.stream
        );
        Ok(token)
    }

    /// Create the group unless a group with exactly this name exists.
    ///
    /// Tags and retention are applied only when the group is created here.
    pub(crate) fn ensure_group(
        &mut self,
        client: &dyn LogServiceClient,
    ) -> Result<(), LogServiceError> {
        let existing = client.describe_log_groups(&self.group)?;
        if existing.iter().any(|name| *name == self.group) {
            self.state.group_exists = true;
            return Ok(());
        }

        debug!("FemtoCloudWatchHandler: creating log group {}", self.group);
        client.create_log_group(&self.group, &self.tags)?;
        if self.retention_days > 0 {
            client.put_retention_policy(&self.group, self.retention_days)?;
        }
        self.state.group_exists = true;
        Ok(())
    }

    /// Look up the stream's upload token, creating the stream if needed.
    ///
    /// A freshly created stream has no token; the first write omits it.
    pub(crate) fn resolve_cursor(
        &mut self,
        client: &dyn LogServiceClient,
    ) -> Result<Option<String>, LogServiceError> {
        let streams = client.describe_log_streams(&self.group, &self.stream)?;
        if let Some(found) = streams.into_iter().find(|s| s.name == self.stream) {
            self.state.stream_exists = true;
            return Ok(found.upload_sequence_token);
        }

        debug!(
            "FemtoCloudWatchHandler: creating log stream {}/{}",
            self.group, self.stream
        );
        client.create_log_stream(&self.group, &self.stream)?;
        self.state.stream_exists = true;
        Ok(None)
    }
}
