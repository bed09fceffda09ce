use std::sync::Arc;

use femtologging_cloudwatch::{
    FemtoHandlerTrait, FemtoLevel, FemtoLogRecord, FemtoLogger, HandlerError, LogServiceError,
    test_utils::CollectingHandler,
};
use rstest::rstest;

/// Handler whose flush always fails, counting how often it was asked.
#[derive(Default)]
struct FailingFlush {
    flushes: parking_lot::Mutex<usize>,
}

impl FemtoHandlerTrait for FailingFlush {
    fn handle(&self, _record: FemtoLogRecord) -> Result<(), HandlerError> {
        Err(HandlerError::Closed)
    }

    fn flush(&self) -> Result<(), HandlerError> {
        *self.flushes.lock() += 1;
        Err(HandlerError::Service(LogServiceError::Service(
            "unreachable".into(),
        )))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[rstest]
#[case(FemtoLevel::Trace, 6)]
#[case(FemtoLevel::Info, 4)]
#[case(FemtoLevel::Error, 2)]
#[case(FemtoLevel::Critical, 1)]
fn logger_level_gates_dispatch(#[case] threshold: FemtoLevel, #[case] expected: usize) {
    let sink = CollectingHandler::new();
    let logger = FemtoLogger::new("core");
    logger.add_handler(Arc::new(sink.clone()));
    logger.set_level(threshold);

    for level in [
        FemtoLevel::Trace,
        FemtoLevel::Debug,
        FemtoLevel::Info,
        FemtoLevel::Warn,
        FemtoLevel::Error,
        FemtoLevel::Critical,
    ] {
        logger.log(level, level.as_str());
    }

    assert_eq!(sink.collected().len(), expected);
}

#[rstest]
fn records_carry_logger_name() {
    let sink = CollectingHandler::new();
    let logger = FemtoLogger::new("billing");
    logger.add_handler(Arc::new(sink.clone()));

    logger.log(FemtoLevel::Info, "こんにちは世界");

    let records = sink.collected();
    assert_eq!(records[0].logger(), "billing");
    assert_eq!(records[0].message(), "こんにちは世界");
}

#[rstest]
fn handler_errors_do_not_stop_dispatch() {
    let sink = CollectingHandler::new();
    let logger = FemtoLogger::new("core");
    logger.add_handler(Arc::new(FailingFlush::default()));
    logger.add_handler(Arc::new(sink.clone()));

    logger.log(FemtoLevel::Warn, "still delivered");

    assert_eq!(sink.messages(), vec!["still delivered"]);
}

#[rstest]
fn flush_visits_every_handler_and_reports_first_error() {
    let first = Arc::new(FailingFlush::default());
    let second = Arc::new(FailingFlush::default());
    let logger = FemtoLogger::new("core");
    logger.add_handler(first.clone());
    logger.add_handler(second.clone());

    let err = logger.flush().expect_err("flush should fail");

    assert!(matches!(err, HandlerError::Service(_)));
    assert_eq!(*first.flushes.lock(), 1);
    assert_eq!(*second.flushes.lock(), 1);
}
