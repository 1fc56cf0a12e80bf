//! # Caller Rate Limiting
//!
//! Per-IP quota on `/analyze`: at most `requests` analyses in any `period`.
//! A GCRA limiter with a burst of `requests` and one token replenished per
//! `period`, so a caller who spends the whole burst waits a full period for
//! the next analysis.

use crate::config::RateLimitConfig;
use anyhow::{anyhow, Result};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DashMapStateStore;
use governor::{Quota, RateLimiter};
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    /// Time until the caller may try again
    pub retry_after: Duration,
}

type KeyedLimiter<C> =
    RateLimiter<IpAddr, DashMapStateStore<IpAddr>, C, NoOpMiddleware<<C as Clock>::Instant>>;

pub struct CallerLimiter<C: Clock = DefaultClock> {
    limiter: KeyedLimiter<C>,
    clock: C,
}

impl CallerLimiter {
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        Self::with_clock(config, DefaultClock::default())
    }
}

impl<C: Clock> CallerLimiter<C> {
    pub fn with_clock(config: &RateLimitConfig, clock: C) -> Result<Self> {
        let burst = NonZeroU32::new(config.requests)
            .ok_or_else(|| anyhow!("rate_limit.requests must be at least 1"))?;
        let quota = Quota::with_period(Duration::from_secs(config.period_secs))
            .ok_or_else(|| anyhow!("rate_limit.period_secs must be at least 1"))?
            .allow_burst(burst);

        Ok(Self {
            limiter: RateLimiter::dashmap_with_clock(quota, &clock),
            clock,
        })
    }

    /// Take one request from the caller's quota
    pub fn check(&self, caller: IpAddr) -> Result<(), RateLimited> {
        self.limiter.check_key(&caller).map_err(|not_until| RateLimited {
            retry_after: not_until.wait_time_from(self.clock.now()),
        })
    }

    /// Forget callers whose quota is full again
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }

    pub fn tracked_callers(&self) -> usize {
        self.limiter.len()
    }
}
