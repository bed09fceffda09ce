//! Test doubles shared by unit tests, integration tests and benchmarks.
//!
//! Compiled for `cfg(test)` and behind the `test-util` feature, which the
//! crate's own dev-dependency enables for `tests/` and `benches/`.

pub mod collecting_handler;
mod in_memory_service;
mod manual_clock;

pub use collecting_handler::CollectingHandler;
pub use in_memory_service::{InMemoryLogService, RecordedPut, ServiceCall, ServiceOp};
pub use manual_clock::ManualClock;
