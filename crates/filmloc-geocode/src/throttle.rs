use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Token-bucket limiter keyed by host, shared between clones.
#[derive(Clone)]
pub struct Throttle {
    buckets: Arc<DashMap<String, Bucket>>,
    rate_per_sec: f64,
    burst: f64,
}

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Throttle {
    /// Zero rates are raised to 1.
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            rate_per_sec: rate_per_sec.max(1) as f64,
            burst: burst.max(1) as f64,
        }
    }

    /// Take a token for `key`, or report how long until one is available.
    pub fn try_acquire(&self, key: &str) -> Result<(), Duration> {
        let mut entry = self.buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.burst,
            last_refill: Instant::now(),
        });
        let now = Instant::now();
        let elapsed = now
            .saturating_duration_since(entry.last_refill)
            .as_secs_f64();
        if elapsed > 0.0 {
            entry.tokens = (entry.tokens + elapsed * self.rate_per_sec).min(self.burst);
            entry.last_refill = now;
        }
        if entry.tokens >= 1.0 {
            entry.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64(
                (1.0 - entry.tokens) / self.rate_per_sec,
            ))
        }
    }

    /// Wait until a token for `key` is available and take it.
    pub async fn acquire(&self, key: &str) {
        while let Err(wait) = self.try_acquire(key) {
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_then_wait() {
        let throttle = Throttle::new(1, 2);
        assert!(throttle.try_acquire("nominatim.openstreetmap.org").is_ok());
        assert!(throttle.try_acquire("nominatim.openstreetmap.org").is_ok());
        let wait = throttle
            .try_acquire("nominatim.openstreetmap.org")
            .expect_err("bucket drained");
        assert!(wait > Duration::ZERO && wait <= Duration::from_secs(1));
    }

    #[test]
    fn hosts_have_separate_buckets() {
        let throttle = Throttle::new(1, 1);
        assert!(throttle.try_acquire("a.example").is_ok());
        assert!(throttle.try_acquire("a.example").is_err());
        assert!(throttle.try_acquire("b.example").is_ok());
        assert!(throttle.clone().try_acquire("a.example").is_err());
    }

    #[tokio::test]
    async fn acquire_waits_for_refill() {
        let throttle = Throttle::new(50, 1);
        throttle.acquire("host").await;
        let start = Instant::now();
        throttle.acquire("host").await;
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
