// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding-window rate limiter over a bounded, expiring counter store.
//!
//! Each client identity gets a counter with a time-to-live. Every request
//! increments the counter and renews its full window, so the window slides
//! with the most recent access rather than anchoring to the first. The
//! store holds a fixed maximum number of identities; inserting beyond the
//! bound evicts the least-recently-touched entry.

use crate::clock::{Clock, SystemClock};
use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Requests counted against this identity so far, including this one
        count: u32,
        /// Remaining requests in the current window
        remaining: u32,
    },
    /// Request is rate limited
    Limited {
        /// Time until the identity's window expires
        retry_after: Duration,
    },
}

/// Per-identity counter entry.
#[derive(Debug)]
struct RateCounterEntry {
    /// Requests counted in the current window
    count: u32,
    /// When the window elapses; renewed on every access
    expires_at: Instant,
    /// Most recent access, for LRU eviction
    last_access: Instant,
}

/// Fixed-capacity key-to-count map with per-entry TTL and LRU eviction.
///
/// Not thread-safe on its own; [`RateLimiter`] wraps it in a lock. Time is
/// passed in explicitly so the store itself stays deterministic.
#[derive(Debug)]
pub struct CounterStore {
    entries: HashMap<String, RateCounterEntry>,
    capacity: usize,
    ttl: Duration,
}

impl CounterStore {
    /// Create a store holding at most `capacity` identities, each expiring
    /// `ttl` after its most recent access.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            ttl,
        }
    }

    /// Count a request for `key` and return the post-increment count.
    ///
    /// An absent or expired entry restarts at 1 with a fresh window. A live
    /// entry is incremented and its window renewed.
    pub fn increment(&mut self, key: &str, now: Instant) -> u32 {
        if let Some(entry) = self.entries.get_mut(key) {
            if entry.expires_at > now {
                entry.count += 1;
                entry.expires_at = now + self.ttl;
                entry.last_access = now;
                return entry.count;
            }
            // Expired entries behave as absent
            self.entries.remove(key);
        }

        if self.entries.len() >= self.capacity {
            self.purge_expired(now);
        }
        if self.entries.len() >= self.capacity {
            self.evict_lru();
        }

        self.entries.insert(
            key.to_string(),
            RateCounterEntry {
                count: 1,
                expires_at: now + self.ttl,
                last_access: now,
            },
        );
        1
    }

    /// Current count for `key`, treating expired entries as absent.
    pub fn count(&self, key: &str, now: Instant) -> Option<u32> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.count)
    }

    /// Time until `key`'s window elapses, if the entry is live.
    pub fn expires_in(&self, key: &str, now: Instant) -> Option<Duration> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.expires_at - now)
    }

    /// Remove entries whose window has elapsed. Returns how many were purged.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    /// Number of resident identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict the entry with the oldest access, by most-recent-access order
    /// rather than insertion order.
    fn evict_lru(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());

        if let Some(key) = victim {
            debug!(identity = %key, "evicting least-recently-seen identity");
            self.entries.remove(&key);
        }
    }
}

/// Thread-safe rate limiter.
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<RwLock<CounterStore>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Create a rate limiter reading time from the given clock.
    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let store = CounterStore::new(config.max_clients, config.window_duration());
        Self {
            config,
            store: Arc::new(RwLock::new(store)),
            clock,
        }
    }

    /// Count a request for `identity` and check it against the threshold.
    ///
    /// The increment happens before the comparison, so the first request
    /// past the threshold is itself counted. One write lock spans the
    /// read-modify-write, so concurrent requests for the same identity
    /// cannot lose updates.
    pub async fn check(&self, identity: &str) -> RateLimitResult {
        let now = self.clock.now();
        let mut store = self.store.write().await;
        let count = store.increment(identity, now);

        if count > self.config.max_requests {
            let retry_after = store
                .expires_in(identity, now)
                .unwrap_or_else(|| self.config.window_duration());
            debug!(identity = %identity, count, ?retry_after, "identity rate limited");
            RateLimitResult::Limited { retry_after }
        } else {
            let remaining = self.config.max_requests - count;
            debug!(identity = %identity, count, remaining, "identity within rate limit");
            RateLimitResult::Allowed { count, remaining }
        }
    }

    /// Drop expired entries (called periodically from a background task).
    pub async fn cleanup(&self) {
        let now = self.clock.now();
        let mut store = self.store.write().await;
        let purged = store.purge_expired(now);
        if purged > 0 {
            debug!(purged, tracked = store.len(), "purged expired rate counters");
        }
    }

    /// Number of identities currently resident in the store.
    pub async fn tracked_identities(&self) -> usize {
        self.store.read().await.len()
    }
}
