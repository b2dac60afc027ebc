//! Per-endpoint rate limiting
//!
//! A windowed counter keyed by endpoint path. The limiter is owned by the
//! client instance and shared by reference, not a process-wide singleton.

use crate::utils::error::{ApiError, ApiResult};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Bucket {
    count: u32,
    reset_at: Instant,
}

/// Windowed request counter keyed by endpoint
///
/// The window resets wholesale when it expires; this is a counting window,
/// not a sliding average. Check-and-increment happens under one lock guard
/// so concurrent callers cannot interleave between the two.
#[derive(Debug, Default)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request against `endpoint`, failing when the window is full
    ///
    /// The failing call does not increment; once the window expires the
    /// bucket is reset lazily on the next check.
    pub fn check(&self, endpoint: &str, limit: u32, window: Duration) -> ApiResult<()> {
        self.check_at(endpoint, limit, window, Instant::now())
    }

    /// Clock-injected variant of [`check`](Self::check)
    pub fn check_at(
        &self,
        endpoint: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> ApiResult<()> {
        let mut buckets = self.buckets.lock().unwrap();

        let bucket = buckets.entry(endpoint.to_string()).or_insert(Bucket {
            count: 0,
            reset_at: now + window,
        });

        if now >= bucket.reset_at {
            bucket.count = 0;
            bucket.reset_at = now + window;
        }

        if bucket.count >= limit {
            let retry_after_ms = bucket
                .reset_at
                .saturating_duration_since(now)
                .as_millis() as u64;
            return Err(ApiError::RateLimitExceeded {
                endpoint: endpoint.to_string(),
                retry_after_ms,
            });
        }

        bucket.count += 1;
        Ok(())
    }

    /// Forget one endpoint's bucket
    pub fn reset(&self, endpoint: &str) {
        self.buckets.lock().unwrap().remove(endpoint);
    }

    /// Forget all buckets; test isolation hook
    pub fn clear(&self) {
        self.buckets.lock().unwrap().clear();
    }
}
