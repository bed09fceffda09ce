//! Compatibility bridge for the Rust `log` crate.
//!
//! This module provides `FemtoLogAdapter`, an implementation of `log::Log`
//! that forwards `log` macro calls into a [`FemtoLogger`], and through it to
//! the CloudWatch handler. Records emitted by this crate itself are ignored
//! so handler diagnostics never feed back into the handler.

use std::sync::Arc;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::level::FemtoLevel;
use crate::log_record::{FemtoLogRecord, RecordMetadata};
use crate::logger::FemtoLogger;

/// Adapter implementing the Rust `log::Log` trait.
pub struct FemtoLogAdapter {
    logger: Arc<FemtoLogger>,
}

fn map_log_level(level: log::Level) -> FemtoLevel {
    match level {
        log::Level::Trace => FemtoLevel::Trace,
        log::Level::Debug => FemtoLevel::Debug,
        log::Level::Info => FemtoLevel::Info,
        log::Level::Warn => FemtoLevel::Warn,
        log::Level::Error => FemtoLevel::Error,
    }
}

impl From<log::Level> for FemtoLevel {
    fn from(level: log::Level) -> Self {
        map_log_level(level)
    }
}

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(env!("CARGO_CRATE_NAME"))
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

impl FemtoLogAdapter {
    pub fn new(logger: Arc<FemtoLogger>) -> Self {
        Self { logger }
    }

    /// Install an adapter for `logger` as the global `log` logger.
    ///
    /// Fails if another global logger is already installed.
    pub fn install(logger: Arc<FemtoLogger>, max_level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(Self::new(logger)))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl log::Log for FemtoLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        !is_own_target(metadata.target())
            && self.logger.is_enabled_for(FemtoLevel::from(metadata.level()))
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let metadata = RecordMetadata {
            module_path: record.module_path().unwrap_or_default().to_string(),
            filename: record.file().unwrap_or_default().to_string(),
            line_number: record.line().unwrap_or(0),
            ..Default::default()
        };
        let femto_record = FemtoLogRecord::with_metadata(
            record.target(),
            FemtoLevel::from(record.level()),
            &record.args().to_string(),
            metadata,
        );
        self.logger.dispatch_record(femto_record);
    }

    fn flush(&self) {
        if let Err(err) = self.logger.flush() {
            eprintln!(
                "femtologging_cloudwatch: flush of logger {:?} failed: {err}",
                self.logger.name()
            );
        }
    }
}
