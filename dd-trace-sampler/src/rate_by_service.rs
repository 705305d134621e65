// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use dd_trace_api::sampling::{mechanism, SamplingDecision};
use dd_trace_api::span::{Span, TraceId};

use crate::constants::cache::SERVICE_KEY_CACHE_SIZE;
use crate::constants::rate::DEFAULT_SAMPLE_RATE;
use crate::rate_sampler::RateSampler;

/// How often a key's applied rate is re-adjusted toward its target.
const ADJUSTMENT_WINDOW: Duration = Duration::from_secs(1);

/// The applied rate never adjusts below this, so a key whose target is
/// positive keeps sampling a trickle instead of starving forever.
const MIN_ADJUSTED_RATE: f64 = 0.0001;

/// Adaptive sampler keyed by (service, operation).
///
/// Each key samples deterministically at an applied rate, and once per window
/// the applied rate is nudged so the observed kept fraction trends toward the
/// key's target rate. Targets default to 1.0 and can be replaced at runtime
/// with [`RateByServiceSampler::update_rates`].
///
/// The key set is an LRU: rarely seen keys are evicted, which bounds memory
/// for workloads with unbounded service/operation cardinality.
pub struct RateByServiceSampler {
    default_rate: f64,
    keys: Mutex<LruCache<String, KeyState>>,
}

struct KeyState {
    target_rate: f64,
    sampler: RateSampler,
    window_start: Instant,
    window_seen: u64,
    window_kept: u64,
}

impl fmt::Debug for RateByServiceSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateByServiceSampler")
            .field("default_rate", &self.default_rate)
            .field("keys", &self.keys.lock().unwrap().len())
            .finish()
    }
}

impl Default for RateByServiceSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl RateByServiceSampler {
    pub fn new() -> Self {
        Self::with_default_rate(DEFAULT_SAMPLE_RATE)
    }

    pub fn with_default_rate(default_rate: f64) -> Self {
        let capacity = NonZeroUsize::new(SERVICE_KEY_CACHE_SIZE)
            .unwrap_or(NonZeroUsize::MIN);
        RateByServiceSampler {
            default_rate: default_rate.clamp(0.0, 1.0),
            keys: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The key a span's sampling state is tracked under.
    pub fn service_key(span: &dyn Span) -> String {
        format!(
            "service:{},operation:{}",
            span.service_name(),
            span.operation_name()
        )
    }

    /// Replaces target rates for the given keys, as provided by the trace
    /// agent. Each updated key restarts from its target.
    pub fn update_rates(&self, rates: HashMap<String, f64>) {
        let mut keys = self.keys.lock().unwrap();
        for (key, rate) in rates {
            keys.put(key, KeyState::new(rate.clamp(0.0, 1.0)));
        }
    }

    pub fn sample(&self, span: &dyn Span) -> bool {
        let keep = self.sample_key(&Self::service_key(span), span.trace_id(), Instant::now());

        let mechanism = mechanism::AGENT_RATE_BY_SERVICE;
        span.set_sampling_decision(SamplingDecision {
            priority: mechanism.to_priority(keep),
            mechanism,
        });
        keep
    }

    fn sample_key(&self, key: &str, trace_id: TraceId, now: Instant) -> bool {
        let mut keys = self.keys.lock().unwrap();
        let state = keys.get_or_insert_mut(key.to_string(), || KeyState::new(self.default_rate));
        state.observe(trace_id, now)
    }

    /// The rate currently applied for a key, mostly useful to inspect
    /// convergence.
    pub fn applied_rate(&self, key: &str) -> Option<f64> {
        self.keys
            .lock()
            .unwrap()
            .peek(key)
            .map(|state| state.sampler.sample_rate())
    }
}

impl KeyState {
    fn new(target_rate: f64) -> Self {
        KeyState {
            target_rate,
            sampler: RateSampler::new(target_rate),
            window_start: Instant::now(),
            window_seen: 0,
            window_kept: 0,
        }
    }

    fn observe(&mut self, trace_id: TraceId, now: Instant) -> bool {
        if now.saturating_duration_since(self.window_start) >= ADJUSTMENT_WINDOW
            && self.window_seen > 0
        {
            self.adjust();
            self.window_start = now;
            self.window_seen = 0;
            self.window_kept = 0;
        }

        let keep = self.sampler.sample(trace_id);
        self.window_seen += 1;
        if keep {
            self.window_kept += 1;
        }
        keep
    }

    /// Moves the applied rate toward the value that would have made the
    /// observed kept fraction equal to the target.
    fn adjust(&mut self) {
        let observed = self.window_kept as f64 / self.window_seen as f64;
        let applied = self.sampler.sample_rate();

        let next = if self.target_rate <= 0.0 {
            0.0
        } else if observed <= 0.0 {
            self.target_rate
        } else {
            (applied * self.target_rate / observed).clamp(MIN_ADJUSTED_RATE, 1.0)
        };
        self.sampler.set_sample_rate(next);
    }
}
