//! Sliding-window log limiter.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;

use super::clock::{Clock, MonotonicClock};
use super::identity::Identity;
use crate::error::{Result, VellumError};

const DEFAULT_LIMIT: usize = 10;
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
const DEFAULT_SWEEP_THRESHOLD: usize = 1000;

/// Limiter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per identity inside one window.
    pub limit: usize,
    /// Length of the trailing window.
    pub window: Duration,
    /// Map size above which expired identities are swept.
    pub sweep_threshold: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            window: DEFAULT_WINDOW,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
        }
    }
}

impl RateLimitConfig {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(VellumError::InvalidInput(
                "Rate limit must allow at least one request".to_string(),
            ));
        }
        if self.window_millis() == 0 {
            return Err(VellumError::InvalidInput(
                "Rate limit window must be at least 1ms".to_string(),
            ));
        }
        Ok(())
    }

    fn window_millis(&self) -> u64 {
        u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Accepted request timestamps for one identity, oldest first.
#[derive(Debug, Default)]
struct RateRecord {
    hits: VecDeque<u64>,
}

impl RateRecord {
    fn prune(&mut self, cutoff: u64) {
        while self.hits.front().is_some_and(|&hit| hit <= cutoff) {
            self.hits.pop_front();
        }
    }
}

/// Per-identity sliding-window limiter.
///
/// Prune, count and append for one identity happen under that identity's
/// shard lock, so concurrent callers can never push it past the limit.
/// Different identities only contend when they hash to the same shard.
pub struct RateLimiter<C = MonotonicClock> {
    config: RateLimitConfig,
    clock: C,
    records: DashMap<String, RateRecord>,
    next_sweep_at: AtomicU64,
}

impl RateLimiter<MonotonicClock> {
    pub fn new(config: RateLimitConfig) -> Result<Self> {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(config: RateLimitConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            records: DashMap::new(),
            next_sweep_at: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Record a request from a raw, possibly forwarded, identity.
    ///
    /// # Errors
    ///
    /// Returns `VellumError::RateLimitExceeded` when the identity already
    /// has `limit` requests inside the window. Rejected requests are not
    /// recorded.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use vellum_core::rate_limit::{RateLimitConfig, RateLimiter};
    ///
    /// let limiter = RateLimiter::new(RateLimitConfig::new(1, Duration::from_secs(60))).unwrap();
    /// assert!(limiter.check(Some("10.0.0.1, 192.168.1.1")).is_ok());
    /// assert!(limiter.check(Some("10.0.0.1")).is_err());
    /// ```
    pub fn check(&self, raw_identity: Option<&str>) -> Result<()> {
        self.check_identity(Identity::from_forwarded(raw_identity))
    }

    /// Record a request from an already extracted identity.
    pub fn check_identity(&self, identity: Identity) -> Result<()> {
        let window = self.config.window_millis();

        let (accepted, now) = {
            let mut record = self.records.entry(identity.as_str().to_string()).or_default();
            // Read the clock under the lock so each record stays ordered.
            let now = self.clock.now_millis();
            if let Some(cutoff) = now.checked_sub(window) {
                record.prune(cutoff);
            }
            if record.hits.len() >= self.config.limit {
                (false, now)
            } else {
                record.hits.push_back(now);
                (true, now)
            }
        };

        if self.records.len() > self.config.sweep_threshold {
            self.maybe_sweep(now, window);
        }

        if accepted {
            Ok(())
        } else {
            tracing::debug!(%identity, "rate limit exceeded");
            Err(VellumError::RateLimitExceeded)
        }
    }

    /// Remove every identity whose requests have all left the window.
    ///
    /// Returns the number of identities removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_millis();
        let Some(cutoff) = now.checked_sub(self.config.window_millis()) else {
            return 0;
        };

        let mut removed = 0;
        self.records.retain(|_, record| {
            record.prune(cutoff);
            let keep = !record.hits.is_empty();
            if !keep {
                removed += 1;
            }
            keep
        });

        tracing::debug!(removed, remaining = self.records.len(), "swept rate limit records");
        removed
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.records.len()
    }

    // Entries need a full window to expire, so sweeping more than once per
    // window cannot free anything new.
    fn maybe_sweep(&self, now: u64, window: u64) {
        let due = self.next_sweep_at.load(Ordering::Acquire);
        if now < due {
            return;
        }
        if self
            .next_sweep_at
            .compare_exchange(due, now.saturating_add(window), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.sweep();
        }
    }
}

impl<C> std::fmt::Debug for RateLimiter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("tracked_identities", &self.records.len())
            .finish()
    }
}
