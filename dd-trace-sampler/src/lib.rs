// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Trace sampling decision layer
//!
//! This crate decides, per trace, whether the trace is kept or dropped:
//! - Deterministic rate-based sampling keyed on trace ids
//! - Token-bucket rate limiting
//! - Glob pattern matching for sampling rules
//! - The sampler variants (accept-all, forced-priority, rate-by-service,
//!   rule-based) and the policy selecting one of them from configuration

pub mod constants;
pub mod glob_matcher;
pub mod priority_sampler;
pub mod rate_by_service;
pub mod rate_limiter;
pub mod rate_sampler;
pub mod rule_sampler;
pub mod rules;
pub mod sampler;

// Re-exports for convenient usage
pub use priority_sampler::ForcePrioritySampler;
pub use rate_by_service::RateByServiceSampler;
pub use rule_sampler::RuleBasedSampler;
pub use rules::{ParsedSamplingRules, SamplingRule, SamplingRuleConfig};
pub use sampler::{AllSampler, Sampler};
