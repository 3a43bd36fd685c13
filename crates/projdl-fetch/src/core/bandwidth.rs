use std::time::Duration;

use tokio::time::Instant;

/// Token bucket algorithm implementation for bandwidth limiting.
///
/// The bucket starts empty and holds at most `capacity` tokens (bytes).
/// Reservations may drive the balance negative; the caller then waits
/// until the debt has been refilled, which bounds the average rate.
#[derive(Debug)]
pub struct TokenBucket {
    tokens:      f64,
    capacity:    f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// `refill_rate` in bytes per second; must be non-zero.
    pub fn new(refill_rate: u64, capacity: u64, now: Instant) -> Self {
        Self {
            tokens:      0.0,
            capacity:    capacity as f64,
            refill_rate: refill_rate.max(1) as f64,
            last_refill: now,
        }
    }

    /// Withdraw `bytes` tokens and return how long to wait before they may
    /// be spent.
    pub fn reserve(&mut self, bytes: u64, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;

        self.tokens -= bytes as f64;
        if self.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-self.tokens / self.refill_rate)
        }
    }

    /// Acquire the specified number of tokens, waiting if necessary.
    pub async fn acquire(&mut self, bytes: u64) {
        let wait = self.reserve(bytes, Instant::now());
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
