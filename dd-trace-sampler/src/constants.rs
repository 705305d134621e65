// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared constants for the dd-trace-sampler crate

/// Sampling rate limits
pub mod rate {
    /// Default sampling rate
    pub const DEFAULT_SAMPLE_RATE: f64 = 1.0;
    /// Maximum sampling rate
    pub const MAX_SAMPLE_RATE: f64 = 1.0;
    /// Minimum sampling rate
    pub const MIN_SAMPLE_RATE: f64 = 0.0;
}

/// Trace rate limiting
pub mod limit {
    /// Sampled traces per second when no limit is configured
    pub const DEFAULT_TRACE_RATE_LIMIT: f64 = 100.0;
}

/// Numeric constants used in sampling algorithms
pub mod numeric {
    /// Knuth's multiplicative hash factor for deterministic sampling
    pub const KNUTH_FACTOR: u64 = 1_111_111_111_111_111_111;
}

/// Recognized values of the forced priority sampling configuration
pub mod force {
    pub const KEEP: &str = "keep";
    pub const DROP: &str = "drop";
}

/// Bounded cache sizes
pub mod cache {
    /// Glob match results kept per matcher
    pub const GLOB_MATCH_CACHE_SIZE: usize = 256;
    /// Per (service, operation) sampling states kept by the rate-by-service
    /// sampler before old keys are evicted
    pub const SERVICE_KEY_CACHE_SIZE: usize = 1024;
}
