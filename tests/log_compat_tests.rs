//! Routing `log` macros through the adapter into the CloudWatch handler.
//!
//! Installing a global logger is a process-wide action, so everything runs
//! in one test.

use std::sync::Arc;

use femtologging_cloudwatch::{
    CloudWatchHandlerBuilder, FemtoLevel, FemtoLogAdapter, FemtoLogger, HandlerBuilderTrait,
    test_utils::{InMemoryLogService, ManualClock},
};
use log::LevelFilter;

#[test]
fn log_macros_reach_the_stream() {
    let service = InMemoryLogService::new();
    let handler = CloudWatchHandlerBuilder::new()
        .with_client(service.clone())
        .with_group("svc")
        .with_stream("main")
        .with_level(FemtoLevel::Info)
        .with_clock(ManualClock::default())
        .build()
        .expect("build");
    let logger = Arc::new(FemtoLogger::new("root"));
    logger.add_handler(Arc::from(handler));

    FemtoLogAdapter::install(Arc::clone(&logger), LevelFilter::Debug).expect("install");
    assert!(
        FemtoLogAdapter::install(Arc::clone(&logger), LevelFilter::Debug).is_err(),
        "second install must fail"
    );

    log::debug!(target: "svc::db", "below handler level");
    log::info!(target: "svc::db", "connected");
    log::warn!(target: "svc::http", "slow request");
    log::logger().flush();

    let stored: Vec<_> = service
        .stored_events("svc", "main")
        .iter()
        .map(|e| e.message().to_owned())
        .collect();
    assert_eq!(
        stored,
        vec!["svc::db: INFO: connected", "svc::http: WARN: slow request"]
    );
}
