//! GA4 Data API request throttle - 10 runReport calls per second per process
use lazy_static::lazy_static;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

lazy_static! {
    static ref GA4_RATE_LIMITER: Mutex<RequestLimiter> = Mutex::new(RequestLimiter::new(10, Duration::from_secs(1)));
}

pub struct RequestLimiter {
    /// Timestamps of requests inside the current window
    request_times: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl RequestLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            request_times: VecDeque::new(),
            max_requests,
            window,
        }
    }

    /// Returns how long the caller must wait; zero means the request was recorded
    pub fn check_and_record(&mut self) -> Duration {
        self.check_and_record_at(Instant::now())
    }

    fn check_and_record_at(&mut self, now: Instant) -> Duration {
        while let Some(&front) = self.request_times.front() {
            if now.duration_since(front) > self.window {
                self.request_times.pop_front();
            } else {
                break;
            }
        }

        if self.request_times.len() >= self.max_requests {
            if let Some(&oldest) = self.request_times.front() {
                let elapsed = now.duration_since(oldest);
                if elapsed < self.window {
                    return self.window - elapsed;
                }
            }
        }

        self.request_times.push_back(now);
        Duration::ZERO
    }
}

/// Wait until the process-wide limiter admits one more runReport call
pub async fn rate_limit_ga4_api() {
    loop {
        let wait_duration = {
            // A poisoned limiter only holds timestamps; keep using it.
            let mut limiter = GA4_RATE_LIMITER.lock().unwrap_or_else(|e| e.into_inner());
            limiter.check_and_record()
        };

        if wait_duration.is_zero() {
            return;
        }
        tracing::debug!("GA4 API throttle: waiting {}ms", wait_duration.as_millis());
        tokio::time::sleep(wait_duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limiter_allows_requests_within_limit() {
        let mut limiter = RequestLimiter::new(10, Duration::from_secs(1));

        for _ in 0..10 {
            assert_eq!(limiter.check_and_record(), Duration::ZERO);
        }
    }

    #[test]
    fn test_limiter_blocks_over_limit() {
        let mut limiter = RequestLimiter::new(10, Duration::from_secs(1));
        let start = Instant::now();

        for _ in 0..10 {
            limiter.check_and_record_at(start);
        }

        let wait = limiter.check_and_record_at(start + Duration::from_millis(250));
        assert_eq!(wait, Duration::from_millis(750));
    }

    #[test]
    fn test_limiter_frees_slots_after_window() {
        let mut limiter = RequestLimiter::new(2, Duration::from_secs(1));
        let start = Instant::now();

        limiter.check_and_record_at(start);
        limiter.check_and_record_at(start);
        let later = start + Duration::from_millis(1001);
        assert_eq!(limiter.check_and_record_at(later), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_rate_limit_ga4_api_admits_first_call() {
        rate_limit_ga4_api().await;
    }
}
