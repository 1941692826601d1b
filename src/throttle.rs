//! Minimum spacing between outbound requests.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum interval between consecutive requests.
///
/// One per fetcher. The lock is held across the wait, so concurrent callers
/// are served one at a time, each at least `min_interval` after the last.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until the interval since the previous request has elapsed, then
    /// record now as the latest request time.
    ///
    /// Returns how long the caller was held back.
    pub async fn wait(&self) -> Duration {
        let mut last = self.last_request.lock().await;
        let mut waited = Duration::ZERO;

        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                waited = self.min_interval - elapsed;
                debug!(wait_ms = waited.as_millis() as u64, "Throttling request");
                tokio::time::sleep(waited).await;
            }
        }

        *last = Some(Instant::now());
        waited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_request_is_not_delayed() {
        let throttle = Throttle::new(Duration::from_secs(60));
        assert_eq!(throttle.wait().await, Duration::ZERO);
    }

    #[tokio::test]
    async fn zero_interval_never_waits() {
        let throttle = Throttle::new(Duration::ZERO);
        throttle.wait().await;
        assert_eq!(throttle.wait().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn second_request_waits_out_the_interval() {
        let throttle = Throttle::new(Duration::from_millis(2000));
        throttle.wait().await;

        let start = Instant::now();
        let waited = throttle.wait().await;
        assert!(waited > Duration::from_millis(1900));
        assert!(start.elapsed() >= Duration::from_millis(1900));
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_requests_pass_through() {
        let throttle = Throttle::new(Duration::from_millis(500));
        throttle.wait().await;
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(throttle.wait().await, Duration::ZERO);
    }
}
