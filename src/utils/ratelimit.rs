/// Sliding-window limiter for outgoing API requests
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct RateLimiter {
    /// Timestamps of requests inside the current window
    request_times: Mutex<VecDeque<Instant>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            request_times: Mutex::new(VecDeque::new()),
            max_requests: max_requests.max(1),
            window,
        }
    }

    pub fn per_second(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(1))
    }

    /// Record a request at `now` if there is room, otherwise return how long to wait
    fn check_and_record(&self, now: Instant) -> Duration {
        let mut times = self
            .request_times
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        while let Some(&front) = times.front() {
            if now.duration_since(front) >= self.window {
                times.pop_front();
            } else {
                break;
            }
        }

        if times.len() >= self.max_requests {
            if let Some(&oldest) = times.front() {
                return self.window.saturating_sub(now.duration_since(oldest));
            }
        }

        times.push_back(now);
        Duration::ZERO
    }

    /// Wait until a request slot is free, then claim it
    pub async fn acquire(&self) {
        loop {
            let wait = self.check_and_record(Instant::now());
            if wait.is_zero() {
                return;
            }
            tracing::debug!("API rate limit: waiting {}ms", wait.as_millis());
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_requests_within_limit() {
        let limiter = RateLimiter::per_second(5);
        let now = Instant::now();

        for _ in 0..5 {
            assert_eq!(limiter.check_and_record(now), Duration::ZERO);
        }
    }

    #[test]
    fn test_blocks_over_limit_until_window_passes() {
        let limiter = RateLimiter::new(2, Duration::from_millis(100));
        let start = Instant::now();

        limiter.check_and_record(start);
        limiter.check_and_record(start);

        let wait = limiter.check_and_record(start + Duration::from_millis(40));
        assert_eq!(wait, Duration::from_millis(60));

        let later = start + Duration::from_millis(100);
        assert_eq!(limiter.check_and_record(later), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_acquire_waits_for_free_slot() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
