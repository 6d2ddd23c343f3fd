//! Fixed-window request limiting, keyed by caller identity.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug)]
struct Bucket {
    count: u32,
    window_start: DateTime<Utc>,
}

/// Counts requests per identity within fixed windows.
///
/// The first request from an identity opens its window; once `max`
/// requests land inside it, further ones are refused until the window
/// elapses. Check and increment happen under one lock so concurrent
/// submissions cannot both squeeze into the last slot.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max: u32,
    window: Duration,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl FixedWindowLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        FixedWindowLimiter {
            max,
            window,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Records a request attempt from `identity` at `now` and decides
    /// whether it may proceed. The timestamp is injected so tests can
    /// advance time without sleeping.
    pub fn check(&self, identity: &str, now: DateTime<Utc>) -> Decision {
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        // Identities are client-supplied, so the map must not keep an
        // entry per identity ever seen. Sweep every elapsed bucket, not
        // just the caller's. A bucket whose start lies in the future
        // (clock skew) fails the elapsed conversion and is dropped too.
        buckets.retain(|_, bucket| {
            now.signed_duration_since(bucket.window_start)
                .to_std()
                .map(|elapsed| elapsed < self.window)
                .unwrap_or(false)
        });

        let bucket = buckets.entry(identity.to_string()).or_insert(Bucket {
            count: 0,
            window_start: now,
        });

        if bucket.count >= self.max {
            let elapsed = now
                .signed_duration_since(bucket.window_start)
                .to_std()
                .unwrap_or_default();
            return Decision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        bucket.count += 1;
        Decision::Allowed {
            remaining: self.max - bucket.count,
        }
    }

    #[cfg(test)]
    fn tracked_identities(&self) -> usize {
        self.buckets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
