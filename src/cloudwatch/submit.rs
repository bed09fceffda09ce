//! Ordered, rate-limited batch writes.

use super::client::{LogServiceClient, LogServiceError, PutLogEvents};
use super::event::LogEvent;
use crate::rate_limiter::RateLimiter;

/// Writes batches to one stream and tracks its sequence token.
#[derive(Debug)]
pub(crate) struct BatchSubmitter {
    group: String,
    stream: String,
    sequence_token: Option<String>,
    limiter: RateLimiter,
}

impl BatchSubmitter {
    pub(crate) fn new(group: String, stream: String, limiter: RateLimiter) -> Self {
        Self {
            group,
            stream,
            sequence_token: None,
            limiter,
        }
    }

    pub(crate) fn sequence_token(&self) -> Option<&str> {
        self.sequence_token.as_deref()
    }

    pub(crate) fn set_sequence_token(&mut self, token: Option<String>) {
        self.sequence_token = token;
    }

    #[cfg(test)]
    pub(crate) fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Sort `events` by timestamp and write them in one request.
    ///
    /// The sort is stable so events sharing a timestamp keep their arrival
    /// order. Waits on the rate limiter before every request. On success the
    /// returned token replaces the stored one; on failure the stored token is
    /// left as it was.
    pub(crate) fn submit(
        &mut self,
        client: &dyn LogServiceClient,
        events: &mut [LogEvent],
    ) -> Result<(), LogServiceError> {
        events.sort_by_key(LogEvent::timestamp);
        self.limiter.acquire();
        let request = PutLogEvents {
            group: &self.group,
            stream: &self.stream,
            events: &*events,
            sequence_token: self.sequence_token.as_deref(),
        };
        let next = client.put_log_events(&request)?;
        self.sequence_token = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SharedClock;
    use crate::cloudwatch::config::RPS_LIMIT;
    use crate::test_utils::{InMemoryLogService, ManualClock};

    fn submitter(clock: &ManualClock) -> BatchSubmitter {
        BatchSubmitter::new(
            "app".into(),
            "web-1".into(),
            RateLimiter::new(RPS_LIMIT, SharedClock::new(clock.clone())),
        )
    }

    fn service() -> InMemoryLogService {
        InMemoryLogService::new()
            .with_group("app")
            .with_stream("app", "web-1", None)
    }

    #[test]
    fn sorts_stably_by_timestamp() {
        let service = service();
        let clock = ManualClock::default();
        let mut submitter = submitter(&clock);
        let mut events = vec![
            LogEvent::new("c".into(), 30),
            LogEvent::new("a1".into(), 10),
            LogEvent::new("b".into(), 20),
            LogEvent::new("a2".into(), 10),
        ];

        submitter.submit(&service, &mut events).expect("submit");

        let puts = service.puts();
        let sent: Vec<_> = puts[0].events.iter().map(LogEvent::message).collect();
        assert_eq!(sent, vec!["a1", "a2", "b", "c"]);
    }

    #[test]
    fn first_write_omits_token_then_chains() {
        let service = service();
        let clock = ManualClock::default();
        let mut submitter = submitter(&clock);

        submitter
            .submit(&service, &mut [LogEvent::new("one".into(), 1)])
            .expect("first");
        submitter
            .submit(&service, &mut [LogEvent::new("two".into(), 2)])
            .expect("second");

        let puts = service.puts();
        assert_eq!(puts[0].sequence_token, None);
        assert_eq!(puts[1].sequence_token, puts[0].returned_token);
        assert_eq!(
            submitter.sequence_token(),
            service.expected_token("app", "web-1").as_deref()
        );
    }

    #[test]
    fn stale_token_is_reported_and_kept() {
        let service = InMemoryLogService::new()
            .with_group("app")
            .with_stream("app", "web-1", Some("current"));
        let clock = ManualClock::default();
        let mut submitter = submitter(&clock);
        submitter.set_sequence_token(Some("stale".into()));

        let err = submitter
            .submit(&service, &mut [LogEvent::new("x".into(), 1)])
            .unwrap_err();

        assert!(matches!(err, LogServiceError::InvalidSequenceToken(_)));
        assert_eq!(submitter.sequence_token(), Some("stale"));
    }

    #[test]
    fn every_attempt_consumes_rate_budget() {
        let service = service();
        let clock = ManualClock::default();
        let mut submitter = submitter(&clock);
        for i in 0..3 {
            submitter
                .submit(&service, &mut [LogEvent::new("x".into(), i)])
                .expect("submit");
        }
        assert_eq!(submitter.limiter().remaining(), RPS_LIMIT - 3);
    }
}
