//! Property-based tests for message splitting and batch sizing.

use femtologging_cloudwatch::{
    CloudWatchHandlerBuilder, DATA_AMOUNT_LIMIT, EVENT_SIZE_LIMIT, FemtoHandlerTrait,
    FemtoLevel, FemtoLogRecord, FemtoFormatter, HandlerBuilderTrait, split_message,
    test_utils::{InMemoryLogService, ManualClock},
};
use proptest::prelude::*;

struct MessageOnly;

impl FemtoFormatter for MessageOnly {
    fn format(&self, record: &FemtoLogRecord) -> String {
        record.message().to_owned()
    }
}

fn large_message() -> impl Strategy<Value = String> {
    // Mix of 1-4 byte code points, repeated past the event limit.
    ("[a-zé€😀]{1,8}", 0usize..(EVENT_SIZE_LIMIT * 3))
        .prop_map(|(unit, len)| unit.repeat(len / unit.len() + 1))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn split_preserves_content_and_limits(message in large_message(), ts in any::<i64>()) {
        let events: Vec<_> = split_message(&message, ts).collect();
        prop_assert!(events.iter().all(|e| !e.message().is_empty()));
        prop_assert!(events.iter().all(|e| e.message().len() <= EVENT_SIZE_LIMIT));
        prop_assert!(events.iter().all(|e| e.timestamp() == ts));
        let joined: String = events.iter().map(|e| e.message()).collect();
        prop_assert_eq!(joined, message);
    }

    #[test]
    fn every_batch_respects_provider_limits(
        sizes in proptest::collection::vec(0usize..(EVENT_SIZE_LIMIT * 2), 1..12),
        batch_size in 1usize..6,
    ) {
        let service = InMemoryLogService::new();
        let handler = CloudWatchHandlerBuilder::new()
            .with_client(service.clone())
            .with_group("g")
            .with_stream("s")
            .with_batch_size(batch_size)
            .with_formatter(MessageOnly)
            .with_clock(ManualClock::default())
            .build_inner()
            .expect("build");

        let mut expected_bytes = 0;
        for size in &sizes {
            expected_bytes += size;
            handler
                .handle(FemtoLogRecord::new("g", FemtoLevel::Info, &"x".repeat(*size)))
                .expect("handle");
        }
        handler.close().expect("close");

        for put in service.puts() {
            prop_assert!(put.events.len() <= batch_size);
            let accounted: usize = put.events.iter().map(|e| e.accounted_size()).sum();
            prop_assert!(accounted < DATA_AMOUNT_LIMIT);
        }
        let stored: usize = service
            .stored_events("g", "s")
            .iter()
            .map(|e| e.message().len())
            .sum();
        prop_assert_eq!(stored, expected_bytes);
    }
}
