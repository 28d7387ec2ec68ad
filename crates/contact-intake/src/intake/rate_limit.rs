use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::RateLimitConfig;

pub const DEFAULT_MAX_REQUESTS: u32 = 5;
pub const DEFAULT_WINDOW_MS: u64 = 15 * 60 * 1000;

/// Namespaced limiter key for contact form submissions from one client.
pub fn contact_key(client: &str) -> String {
    format!("contact:{client}")
}

/// Quota and window length, fixed for the lifetime of a limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    max_requests: u32,
    window: Duration,
}

impl RateLimitPolicy {
    /// Zero quotas or windows fall back to the defaults.
    pub fn new(max_requests: u32, window_ms: u64) -> Self {
        let max_requests = if max_requests == 0 {
            DEFAULT_MAX_REQUESTS
        } else {
            max_requests
        };
        let window_ms = if window_ms == 0 || window_ms > i64::MAX as u64 {
            DEFAULT_WINDOW_MS
        } else {
            window_ms
        };

        Self {
            max_requests,
            window: Duration::milliseconds(window_ms as i64),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_MS)
    }
}

impl From<&RateLimitConfig> for RateLimitPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window_ms)
    }
}

/// Result of a single quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Reset instant as epoch milliseconds, the unit used on the wire.
    pub fn reset_millis(&self) -> i64 {
        self.reset_at.timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_at: DateTime<Utc>,
}

impl RateLimitEntry {
    fn open(now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: now + window,
        }
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.reset_at
    }
}

#[derive(Debug, Default)]
struct LimiterState {
    entries: HashMap<String, RateLimitEntry>,
    next_sweep: Option<DateTime<Utc>>,
}

impl LimiterState {
    /// Drops expired entries at most once per window.
    fn sweep_if_due(&mut self, now: DateTime<Utc>, window: Duration) {
        if matches!(self.next_sweep, Some(at) if now < at) {
            return;
        }
        self.entries.retain(|_, entry| entry.is_live(now));
        self.next_sweep = Some(now + window);
    }
}

/// Fixed-window counter keyed by client. All reads and writes for a key happen
/// under one lock, so concurrent callers cannot over-admit.
#[derive(Debug)]
pub struct RateLimiter {
    policy: RateLimitPolicy,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(LimiterState::default()),
        }
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Utc::now())
    }

    pub fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let max_requests = self.policy.max_requests;
        let window = self.policy.window;

        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        state.sweep_if_due(now, window);

        let entry = state
            .entries
            .entry(key.to_string())
            .or_insert_with(|| RateLimitEntry::open(now, window));
        if !entry.is_live(now) {
            *entry = RateLimitEntry::open(now, window);
        }

        if entry.count >= max_requests {
            return RateLimitDecision {
                allowed: false,
                limit: max_requests,
                remaining: 0,
                reset_at: entry.reset_at,
            };
        }

        entry.count += 1;
        RateLimitDecision {
            allowed: true,
            limit: max_requests,
            remaining: max_requests - entry.count,
            reset_at: entry.reset_at,
        }
    }

    /// Forgets the window for `key`; the next check starts fresh.
    pub fn reset(&self, key: &str) {
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        state.entries.remove(key);
    }

    /// Number of keys with a live window.
    pub fn tracked_keys(&self) -> usize {
        self.tracked_keys_at(Utc::now())
    }

    pub fn tracked_keys_at(&self, now: DateTime<Utc>) -> usize {
        self.state
            .lock()
            .expect("rate limiter mutex poisoned")
            .entries
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Current count for `key`, or `None` when no live window exists.
    pub fn usage_at(&self, key: &str, now: DateTime<Utc>) -> Option<u32> {
        let state = self.state.lock().expect("rate limiter mutex poisoned");
        state
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.count)
    }
}
