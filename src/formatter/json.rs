//! JSON formatter rendering each record as a single-line object.
//!
//! The object borrows from the record so formatting allocates only the
//! output string and the RFC 3339 timestamp.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use super::FemtoFormatter;
use crate::log_record::FemtoLogRecord;

/// Formatter emitting `{"datetime", "channel", "level", "message", ...}` JSON.
///
/// Structured key-values are flattened into the top-level object after the
/// fixed fields. When `include_source` is set the source location is added as
/// `file`, `line` and `module`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFormatter {
    include_source: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the source file, line, and module path in each object.
    pub fn with_source(mut self) -> Self {
        self.include_source = true;
        self
    }
}

struct JsonRecord<'a> {
    datetime: String,
    channel: &'a str,
    level: &'static str,
    message: &'a str,
    source: Option<(&'a str, u32, &'a str)>,
    key_values: &'a BTreeMap<String, String>,
}

impl<'a> JsonRecord<'a> {
    fn new(record: &'a FemtoLogRecord, include_source: bool) -> Self {
        let metadata = record.metadata();
        let datetime: DateTime<Utc> = metadata.timestamp.into();
        Self {
            datetime: datetime.to_rfc3339_opts(SecondsFormat::Millis, true),
            channel: record.logger(),
            level: record.level_str(),
            message: record.message(),
            source: include_source.then(|| {
                (
                    metadata.filename.as_str(),
                    metadata.line_number,
                    metadata.module_path.as_str(),
                )
            }),
            key_values: &metadata.key_values,
        }
    }
}

impl Serialize for JsonRecord<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = 4 + if self.source.is_some() { 3 } else { 0 } + self.key_values.len();
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("datetime", &self.datetime)?;
        map.serialize_entry("channel", self.channel)?;
        map.serialize_entry("level", self.level)?;
        map.serialize_entry("message", self.message)?;
        if let Some((file, line, module)) = self.source {
            map.serialize_entry("file", file)?;
            map.serialize_entry("line", &line)?;
            map.serialize_entry("module", module)?;
        }
        for (k, v) in self.key_values {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl FemtoFormatter for JsonFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        match serde_json::to_string(&JsonRecord::new(record, self.include_source)) {
            Ok(json) => json,
            Err(err) => {
                warn!("JsonFormatter serialization error: {err}");
                record.message().to_owned()
            }
        }
    }
}
