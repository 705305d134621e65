// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use dd_trace_api::span::TraceId;

use crate::constants::numeric::KNUTH_FACTOR;
use crate::constants::rate::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};

/// Sampler based on a rate.
///
/// Keeps (100 * `sample_rate`)% of the traces, deterministically on the trace
/// id: the same trace is kept or dropped by every process that samples it at
/// the same rate.
#[derive(Clone)]
pub struct RateSampler {
    sample_rate: f64,
    sampling_id_threshold: u64,
}

impl fmt::Debug for RateSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateSampler")
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

fn threshold_for(sample_rate: f64) -> u64 {
    if sample_rate >= MAX_SAMPLE_RATE {
        u64::MAX
    } else {
        (sample_rate * (u64::MAX as f64)) as u64
    }
}

impl RateSampler {
    /// Creates a new `RateSampler`.
    /// `sample_rate` is clamped between 0.0 and 1.0 inclusive.
    pub fn new(sample_rate: f64) -> Self {
        let clamped_rate = sample_rate.clamp(MIN_SAMPLE_RATE, MAX_SAMPLE_RATE);
        RateSampler {
            sample_rate: clamped_rate,
            sampling_id_threshold: threshold_for(clamped_rate),
        }
    }

    /// Sets a new sample rate for the sampler.
    /// `sample_rate` is clamped between 0.0 and 1.0 inclusive.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        let clamped_rate = sample_rate.clamp(MIN_SAMPLE_RATE, MAX_SAMPLE_RATE);
        self.sample_rate = clamped_rate;
        self.sampling_id_threshold = threshold_for(clamped_rate);
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Decides whether a trace is kept at this sampler's rate.
    pub fn sample(&self, trace_id: TraceId) -> bool {
        if self.sample_rate <= MIN_SAMPLE_RATE {
            return false;
        }
        if self.sample_rate >= MAX_SAMPLE_RATE {
            return true;
        }

        let hashed_trace_id = trace_id.lower_64bits().wrapping_mul(KNUTH_FACTOR);
        hashed_trace_id <= self.sampling_id_threshold
    }
}
