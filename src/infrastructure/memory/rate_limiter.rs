//! In-memory sliding-window rate limiter.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::info;

use super::janitor::{Janitor, Sweep};

/// How often idle keys are evicted.
pub const JANITOR_PERIOD: Duration = Duration::from_secs(60);

/// Per-key sliding-window request counter.
///
/// Each key maps to the timestamps of its accepted requests inside the trailing
/// window. All reads and writes of one key happen under that key's `DashMap`
/// shard lock, so concurrent callers for the same key are serialized and can
/// never push the count past `limit`.
pub struct RateLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
    limit: usize,
    window: Duration,
    janitor: Mutex<Option<Janitor>>,
}

impl RateLimiter {
    /// Creates a limiter without a janitor. Stale keys are only pruned on access
    /// or by calling [`sweep`](Self::sweep).
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
            janitor: Mutex::new(None),
        }
    }

    /// Creates a limiter and starts its janitor. Must be called inside a Tokio
    /// runtime.
    pub fn start(limit: usize, window: Duration) -> Arc<Self> {
        let limiter = Arc::new(Self::new(limit, window));
        let janitor = Janitor::spawn("rate_limiter", Arc::downgrade(&limiter), JANITOR_PERIOD);
        *limiter.janitor.lock() = Some(janitor);
        limiter
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a request for `key` if it is under quota.
    ///
    /// Returns false without recording anything when the key already has
    /// `limit` requests inside the window. A zero limit or zero window rejects
    /// every request.
    pub fn allow(&self, key: &str) -> bool {
        if self.limit == 0 || self.window.is_zero() {
            return false;
        }

        let now = Instant::now();
        let mut entry = self.windows.entry(key.to_owned()).or_default();
        let timestamps = entry.value_mut();

        prune(timestamps, now, self.window);

        if timestamps.len() >= self.limit {
            return false;
        }

        timestamps.push_back(now);
        true
    }

    /// Requests left for `key` in the current window.
    pub fn remaining(&self, key: &str) -> usize {
        if self.limit == 0 || self.window.is_zero() {
            return 0;
        }

        let now = Instant::now();
        let used = self
            .windows
            .get(key)
            .map(|ts| ts.iter().filter(|&&t| now.duration_since(t) < self.window).count())
            .unwrap_or(0);

        self.limit.saturating_sub(used)
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Stops the janitor, if one is running, and waits for it to exit.
    pub async fn shutdown(&self) {
        let janitor = self.janitor.lock().take();
        if let Some(janitor) = janitor {
            janitor.shutdown().await;
            info!("Rate limiter janitor stopped");
        }
    }
}

impl Sweep for RateLimiter {
    /// Prunes every key and drops keys left without timestamps.
    fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut evicted = 0;

        self.windows.retain(|_, timestamps| {
            prune(timestamps, now, self.window);
            if timestamps.is_empty() {
                evicted += 1;
                return false;
            }
            true
        });

        evicted
    }
}

/// Drops timestamps that are `window` or more in the past.
fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = timestamps.front() {
        if now.duration_since(front) >= window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}
