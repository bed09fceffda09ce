//! In-process stand-in for the remote log service.
//!
//! Enforces sequence tokens the way the real service does: once a stream
//! has been written, every write must present the token returned by the
//! previous one. Failures can be scripted per operation.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cloudwatch::{
    LogEvent, LogServiceClient, LogServiceError, LogStreamDescription, PutLogEvents,
};

/// Remote operations, used to script failures and filter the call log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServiceOp {
    PutLogEvents,
    DescribeLogGroups,
    CreateLogGroup,
    PutRetentionPolicy,
    DescribeLogStreams,
    CreateLogStream,
}

/// A `put_log_events` call as received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedPut {
    pub group: String,
    pub stream: String,
    pub events: Vec<LogEvent>,
    pub sequence_token: Option<String>,
    /// Token handed back to the caller, `None` when the call failed.
    pub returned_token: Option<String>,
}

/// Every call received, in order, including failed ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceCall {
    PutLogEvents(RecordedPut),
    DescribeLogGroups { prefix: String },
    CreateLogGroup { name: String, tags: BTreeMap<String, String> },
    PutRetentionPolicy { group: String, days: u32 },
    DescribeLogStreams { group: String, prefix: String },
    CreateLogStream { group: String, name: String },
}

impl ServiceCall {
    pub fn op(&self) -> ServiceOp {
        match self {
            Self::PutLogEvents(_) => ServiceOp::PutLogEvents,
            Self::DescribeLogGroups { .. } => ServiceOp::DescribeLogGroups,
            Self::CreateLogGroup { .. } => ServiceOp::CreateLogGroup,
            Self::PutRetentionPolicy { .. } => ServiceOp::PutRetentionPolicy,
            Self::DescribeLogStreams { .. } => ServiceOp::DescribeLogStreams,
            Self::CreateLogStream { .. } => ServiceOp::CreateLogStream,
        }
    }
}

#[derive(Debug, Default)]
struct StreamData {
    events: Vec<LogEvent>,
    token: Option<String>,
}

#[derive(Debug, Default)]
struct GroupData {
    tags: BTreeMap<String, String>,
    retention_days: Option<u32>,
    streams: BTreeMap<String, StreamData>,
}

#[derive(Debug, Default)]
struct ServiceState {
    groups: BTreeMap<String, GroupData>,
    calls: Vec<ServiceCall>,
    failures: HashMap<ServiceOp, VecDeque<LogServiceError>>,
    next_token: u64,
}

impl ServiceState {
    fn scripted_failure(&mut self, op: ServiceOp) -> Result<(), LogServiceError> {
        match self.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn stream_mut(&mut self, group: &str, stream: &str) -> Result<&mut StreamData, LogServiceError> {
        self.groups
            .get_mut(group)
            .ok_or_else(|| not_found("log group", group))?
            .streams
            .get_mut(stream)
            .ok_or_else(|| not_found("log stream", stream))
    }

    fn mint_token(&mut self) -> String {
        self.next_token += 1;
        format!("token-{:04}", self.next_token)
    }

    fn put(&mut self, request: &PutLogEvents<'_>) -> Result<Option<String>, LogServiceError> {
        self.scripted_failure(ServiceOp::PutLogEvents)?;
        let token = self.mint_token();
        let stream = self.stream_mut(request.group, request.stream)?;
        if stream.token.as_deref() != request.sequence_token {
            return Err(LogServiceError::InvalidSequenceToken(format!(
                "the next expected sequenceToken is: {}",
                stream.token.as_deref().unwrap_or("null")
            )));
        }
        stream.events.extend_from_slice(request.events);
        stream.token = Some(token.clone());
        Ok(Some(token))
    }
}

fn not_found(kind: &str, name: &str) -> LogServiceError {
    LogServiceError::Service(format!("ResourceNotFoundException: {kind} {name} does not exist"))
}

fn already_exists(kind: &str, name: &str) -> LogServiceError {
    LogServiceError::Service(format!("ResourceAlreadyExistsException: {kind} {name} exists"))
}

/// Cloneable in-memory log service; clones share state.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLogService {
    state: Arc<Mutex<ServiceState>>,
}

impl InMemoryLogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing group.
    pub fn with_group(self, name: &str) -> Self {
        self.state.lock().groups.entry(name.to_owned()).or_default();
        self
    }

    /// Seed an existing stream whose next write expects `token`.
    pub fn with_stream(self, group: &str, name: &str, token: Option<&str>) -> Self {
        {
            let mut state = self.state.lock();
            let group = state.groups.entry(group.to_owned()).or_default();
            group.streams.insert(
                name.to_owned(),
                StreamData {
                    events: Vec::new(),
                    token: token.map(str::to_owned),
                },
            );
        }
        self
    }

    /// Make the next call of `op` fail with `err`. Repeated calls queue
    /// further failures.
    pub fn fail_next(&self, op: ServiceOp, err: LogServiceError) {
        self.state
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(err);
    }

    /// Simulate another writer appending to the stream, invalidating the
    /// token held by any other client.
    pub fn interleave_write(&self, group: &str, stream: &str) {
        let mut state = self.state.lock();
        let token = state.mint_token();
        if let Ok(data) = state.stream_mut(group, stream) {
            data.token = Some(token);
        }
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.state.lock().calls.clone()
    }

    /// Every `put_log_events` call received, successful or not.
    pub fn puts(&self) -> Vec<RecordedPut> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ServiceCall::PutLogEvents(put) => Some(put.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, op: ServiceOp) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    /// Events accepted into a stream.
    pub fn stored_events(&self, group: &str, stream: &str) -> Vec<LogEvent> {
        self.state
            .lock()
            .stream_mut(group, stream)
            .map(|s| s.events.clone())
            .unwrap_or_default()
    }

    pub fn expected_token(&self, group: &str, stream: &str) -> Option<String> {
        self.state
            .lock()
            .stream_mut(group, stream)
            .ok()
            .and_then(|s| s.token.clone())
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.state.lock().groups.contains_key(name)
    }

    pub fn has_stream(&self, group: &str, name: &str) -> bool {
        self.state
            .lock()
            .groups
            .get(group)
            .is_some_and(|g| g.streams.contains_key(name))
    }

    pub fn group_tags(&self, name: &str) -> BTreeMap<String, String> {
        self.state
            .lock()
            .groups
            .get(name)
            .map(|g| g.tags.clone())
            .unwrap_or_default()
    }

    pub fn retention(&self, name: &str) -> Option<u32> {
        self.state
            .lock()
            .groups
            .get(name)
            .and_then(|g| g.retention_days)
    }
}

impl LogServiceClient for InMemoryLogService {
    fn put_log_events(&self, request: &PutLogEvents<'_>) -> Result<Option<String>, LogServiceError> {
        let mut state = self.state.lock();
        let result = state.put(request);
        state.calls.push(ServiceCall::PutLogEvents(RecordedPut {
            group: request.group.to_owned(),
            stream: request.stream.to_owned(),
            events: request.events.to_vec(),
            sequence_token: request.sequence_token.map(str::to_owned),
            returned_token: result.clone().ok().flatten(),
        }));
        result
    }

    fn describe_log_groups(&self, prefix: &str) -> Result<Vec<String>, LogServiceError> {
        let mut state = self.state.lock();
        state.calls.push(ServiceCall::DescribeLogGroups {
            prefix: prefix.to_owned(),
        });
        state.scripted_failure(ServiceOp::DescribeLogGroups)?;
        Ok(state
            .groups
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn create_log_group(
        &self,
        name: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<(), LogServiceError> {
        let mut state = self.state.lock();
        state.calls.push(ServiceCall::CreateLogGroup {
            name: name.to_owned(),
            tags: tags.clone(),
        });
        state.scripted_failure(ServiceOp::CreateLogGroup)?;
        if state.groups.contains_key(name) {
            return Err(already_exists("log group", name));
        }
        state.groups.insert(
            name.to_owned(),
            GroupData {
                tags: tags.clone(),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn put_retention_policy(&self, group: &str, days: u32) -> Result<(), LogServiceError> {
        let mut state = self.state.lock();
        state.calls.push(ServiceCall::PutRetentionPolicy {
            group: group.to_owned(),
            days,
        });
        state.scripted_failure(ServiceOp::PutRetentionPolicy)?;
        let data = state
            .groups
            .get_mut(group)
            .ok_or_else(|| not_found("log group", group))?;
        data.retention_days = Some(days);
        Ok(())
    }

    fn describe_log_streams(
        &self,
        group: &str,
        prefix: &str,
    ) -> Result<Vec<LogStreamDescription>, LogServiceError> {
        let mut state = self.state.lock();
        state.calls.push(ServiceCall::DescribeLogStreams {
            group: group.to_owned(),
            prefix: prefix.to_owned(),
        });
        state.scripted_failure(ServiceOp::DescribeLogStreams)?;
        let data = state
            .groups
            .get(group)
            .ok_or_else(|| not_found("log group", group))?;
        Ok(data
            .streams
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, s)| LogStreamDescription::new(name.clone(), s.token.clone()))
            .collect())
    }

    fn create_log_stream(&self, group: &str, name: &str) -> Result<(), LogServiceError> {
        let mut state = self.state.lock();
        state.calls.push(ServiceCall::CreateLogStream {
            group: group.to_owned(),
            name: name.to_owned(),
        });
        state.scripted_failure(ServiceOp::CreateLogStream)?;
        let data = state
            .groups
            .get_mut(group)
            .ok_or_else(|| not_found("log group", group))?;
        if data.streams.contains_key(name) {
            return Err(already_exists("log stream", name));
        }
        data.streams.insert(name.to_owned(), StreamData::default());
        Ok(())
    }
}
