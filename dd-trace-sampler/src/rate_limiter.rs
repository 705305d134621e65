// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// The time window over which the limit applies and the effective rate is
/// measured.
const WINDOW: Duration = Duration::from_secs(1);

/// A token bucket rate limiter.
///
/// * `rate_limit > 0.0`: allow at most `rate_limit` acquisitions per second,
///   with a burst capacity of `rate_limit` tokens
/// * `rate_limit == 0.0`: disallow all acquisitions
/// * `rate_limit < 0.0`: allow all acquisitions
pub struct RateLimiter {
    rate_limit: f64,

    /// Bucket and window bookkeeping, updated under a single lock so counts
    /// are never lost under contention
    state: Mutex<LimiterState>,
}

struct LimiterState {
    /// Tokens currently available
    tokens: f64,

    /// Last time tokens were replenished
    last_refill: Instant,

    /// Start of the current measurement window
    window_start: Option<Instant>,

    /// Acquisitions allowed in the current window
    window_allowed: u64,

    /// Acquisitions requested in the current window
    window_seen: u64,

    /// Rate of the previous window, averaged into the effective rate
    prev_window_rate: Option<f64>,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rate_limit", &self.rate_limit)
            .field("effective_rate", &self.effective_rate())
            .finish()
    }
}

impl RateLimiter {
    pub fn new(rate_limit: f64) -> Self {
        RateLimiter {
            rate_limit,
            state: Mutex::new(LimiterState {
                tokens: rate_limit.max(0.0),
                last_refill: Instant::now(),
                window_start: None,
                window_allowed: 0,
                window_seen: 0,
                prev_window_rate: None,
            }),
        }
    }

    pub fn rate_limit(&self) -> f64 {
        self.rate_limit
    }

    /// Checks whether the current acquisition is allowed, consuming a token
    /// if it is.
    pub fn is_allowed(&self) -> bool {
        self.is_allowed_at(Instant::now())
    }

    fn is_allowed_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap();

        self.roll_window(&mut state, now);

        let allowed = if self.rate_limit < 0.0 {
            true
        } else if self.rate_limit == 0.0 {
            false
        } else {
            self.replenish(&mut state, now);
            if state.tokens >= 1.0 {
                state.tokens -= 1.0;
                true
            } else {
                false
            }
        };

        state.window_seen += 1;
        if allowed {
            state.window_allowed += 1;
        }
        allowed
    }

    /// Refills tokens proportionally to the time elapsed since the last
    /// acquisition attempt, capped at the burst capacity.
    fn replenish(&self, state: &mut LimiterState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.last_refill);
        state.tokens =
            (state.tokens + elapsed.as_secs_f64() * self.rate_limit).min(self.rate_limit);
        state.last_refill = now;
    }

    /// Closes the measurement window if it expired, keeping the previous
    /// window's rate around for averaging.
    fn roll_window(&self, state: &mut LimiterState, now: Instant) {
        match state.window_start {
            None => state.window_start = Some(now),
            Some(start) => {
                if now.saturating_duration_since(start) >= WINDOW {
                    state.prev_window_rate = Some(window_rate(state));
                    state.window_allowed = 0;
                    state.window_seen = 0;
                    state.window_start = Some(now);
                }
            }
        }
    }

    /// The fraction of acquisitions this limiter allowed recently, between
    /// 0.0 and 1.0. Averages the current and previous windows.
    pub fn effective_rate(&self) -> f64 {
        let state = self.state.lock().unwrap();

        match state.prev_window_rate {
            Some(prev_rate) => (window_rate(&state) + prev_rate) / 2.0,
            None => window_rate(&state),
        }
    }
}

/// No acquisitions seen is effectively a 100% allow rate.
fn window_rate(state: &LimiterState) -> f64 {
    if state.window_seen == 0 {
        return 1.0;
    }
    state.window_allowed as f64 / state.window_seen as f64
}
