//! Test helpers for handler builders.
//!
//! This module centralizes repeated assertions used across builder tests.

use super::{HandlerBuildError, HandlerBuilderTrait};

/// Assert that building a handler fails with an error mentioning `needle`.
pub fn assert_build_err<B>(builder: &B, needle: &str)
where
    B: HandlerBuilderTrait,
{
    match builder.build_inner() {
        Ok(_) => panic!("expected build to fail with {needle:?}"),
        Err(HandlerBuildError::InvalidConfig(msg)) => assert!(
            msg.contains(needle),
            "expected error containing {needle:?}, got {msg:?}"
        ),
    }
}
