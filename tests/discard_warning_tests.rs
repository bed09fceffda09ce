//! Warnings emitted when batches are discarded after failed submissions.

use std::sync::Arc;

use femtologging_cloudwatch::{
    CloudWatchHandlerBuilder, FemtoHandlerTrait, FemtoLevel, FemtoLogRecord, HandlerBuilderTrait,
    LogServiceError,
    test_utils::{InMemoryLogService, ManualClock, ServiceOp},
};
use logtest::Logger;
use rstest::rstest;

fn drain_warnings(logger: &mut Logger) -> Vec<String> {
    let mut warnings = Vec::new();
    while let Some(record) = logger.pop() {
        if record.level() == log::Level::Warn {
            warnings.push(record.args().to_owned());
        }
    }
    warnings
}

fn builder(service: &InMemoryLogService) -> CloudWatchHandlerBuilder {
    CloudWatchHandlerBuilder::new()
        .with_shared_client(Arc::new(service.clone()))
        .with_group("app")
        .with_stream("worker")
        .with_clock(ManualClock::default())
}

#[rstest]
fn failed_submission_warns_with_event_count() {
    let mut logger = Logger::start();
    let service = InMemoryLogService::new();
    service.fail_next(
        ServiceOp::PutLogEvents,
        LogServiceError::Service("ServiceUnavailableException".into()),
    );
    let handler = builder(&service).build_inner().expect("build");

    handler
        .handle(FemtoLogRecord::new("app", FemtoLevel::Error, "first"))
        .expect("handle");
    handler
        .handle(FemtoLogRecord::new("app", FemtoLevel::Error, "second"))
        .expect("handle");
    assert!(handler.flush().is_err());

    let warnings = drain_warnings(&mut logger);
    assert!(
        warnings
            .iter()
            .any(|w| w.contains("failed to submit 2 events") && w.contains("ServiceUnavailable")),
        "warnings: {warnings:?}"
    );
    assert!(
        warnings.iter().any(|w| w.contains("discarded 2 events")),
        "warnings: {warnings:?}"
    );
}
