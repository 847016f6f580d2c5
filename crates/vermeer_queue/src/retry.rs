//! Per-queue delivery settings and the backoff they produce.

use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};

/// Concurrency and retry policy of one queue.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct QueueSettings {
    /// Jobs running at once
    concurrency: usize,
    /// Attempts per job, including the first
    attempts: usize,
    /// Base delay before the first retry
    initial_backoff: Duration,
    /// Upper bound on any single retry delay
    max_backoff: Duration,
    /// Buffered jobs before `enqueue` waits
    capacity: usize,
}

impl QueueSettings {
    /// Create settings. Zero concurrency, attempts or capacity are raised to one.
    pub fn new(
        concurrency: usize,
        attempts: usize,
        initial_backoff: Duration,
        max_backoff: Duration,
        capacity: usize,
    ) -> Self {
        Self {
            concurrency: concurrency.max(1),
            attempts: attempts.max(1),
            initial_backoff,
            max_backoff,
            capacity: capacity.max(1),
        }
    }

    /// Plan execution defaults: low concurrency to respect provider rate limits.
    pub fn generation() -> Self {
        Self::new(2, 3, Duration::from_secs(5), Duration::from_secs(300), 256)
    }

    /// Publish defaults: moderate concurrency, mostly transport I/O.
    pub fn publish() -> Self {
        Self::new(5, 5, Duration::from_secs(2), Duration::from_secs(120), 1024)
    }

    /// Retry delays for a job with `attempts` total attempts.
    pub(crate) fn backoff(&self, attempts: usize) -> impl Iterator<Item = Duration> + use<> {
        let initial_ms = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        ExponentialBackoff::from_millis(initial_ms.max(1))
            .factor(2)
            .max_delay(self.max_backoff)
            .map(jitter)
            .take(attempts.saturating_sub(1))
    }
}
