use std::time::Duration;

use crate::error::FetchError;

/// Fixed-delay retry budget: one initial attempt plus `retries` more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, backoff: Duration) -> Self { Self { retries, backoff } }

    pub fn max_attempts(&self) -> u32 { self.retries.saturating_add(1) }

    /// Delay before the next attempt after attempt `attempt` (0-indexed)
    /// failed with `error`, or `None` when no attempt remains.
    pub fn next_delay(&self, attempt: u32, error: &FetchError) -> Option<Duration> {
        (error.is_retryable() && attempt < self.retries).then_some(self.backoff)
    }
}
