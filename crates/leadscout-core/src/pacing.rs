use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::app_config::AppConfig;

/// Enforces a minimum gap between successive acquisitions.
///
/// Callers that share one limiter are serialized through it: each
/// `acquire` waits until `interval` has passed since the previous one.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next request slot. The first call returns immediately.
    pub async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval.saturating_sub(elapsed)).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Outbound request pacing for one run: page visits and reachability probes
/// each get their own limiter.
#[derive(Debug, Clone)]
pub struct Pacing {
    pub page_visit: Arc<RateLimiter>,
    pub probe: Arc<RateLimiter>,
}

impl Pacing {
    #[must_use]
    pub fn new(page_visit_interval: Duration, probe_interval: Duration) -> Self {
        Self {
            page_visit: Arc::new(RateLimiter::new(page_visit_interval)),
            probe: Arc::new(RateLimiter::new(probe_interval)),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Duration::from_millis(config.page_delay_ms),
            Duration::from_millis(config.probe_delay_ms),
        )
    }

    /// No waiting at all. Used by tests and offline tooling.
    #[must_use]
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_acquire_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_acquires_are_spaced_by_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        let start = Instant::now();
        for _ in 0..4 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_callers_are_not_delayed() {
        let limiter = RateLimiter::new(Duration::from_millis(200));
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn limiters_are_independent() {
        let pacing = Pacing::new(Duration::from_millis(250), Duration::from_millis(200));
        let start = Instant::now();
        pacing.page_visit.acquire().await;
        pacing.probe.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(pacing.probe.interval(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_the_same_slots() {
        let pacing = Pacing::new(Duration::from_millis(250), Duration::ZERO);
        let other = pacing.clone();
        let start = Instant::now();
        pacing.page_visit.acquire().await;
        other.page_visit.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}
