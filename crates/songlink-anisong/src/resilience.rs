//! Request pacing for the catalog client.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration};

/// Per-client rate limiter.
///
/// Limits throughput to a configurable number of requests per second by
/// combining a single-permit [`Semaphore`] with a fixed sleep interval.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    interval: Duration,
}

impl RateLimiter {
    /// Allow at most `requests_per_second` requests per second. Zero is
    /// treated as one.
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            interval: Duration::from_millis(1000 / u64::from(requests_per_second.max(1))),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until a request slot is available, then holds the slot for
    /// the configured interval.
    pub async fn acquire(&self) {
        match self.semaphore.acquire().await {
            Ok(_permit) => sleep(self.interval).await,
            Err(_) => log::warn!("Rate limiter closed; sending request unpaced"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_from_rate() {
        assert_eq!(RateLimiter::new(4).interval(), Duration::from_millis(250));
        assert_eq!(RateLimiter::new(0).interval(), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_acquire_spaces_requests() {
        let limiter = RateLimiter::new(20);
        let start = tokio::time::Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
