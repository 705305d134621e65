// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use dd_trace_api::span::{Span, TraceId};
use dd_trace_api::{Error, Result};

use crate::constants::rate::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
use crate::glob_matcher::GlobMatcher;
use crate::rate_limiter::RateLimiter;
use crate::rate_sampler::RateSampler;

/// Configuration for a single explicit sampling rule, as carried by the
/// `DD_TRACE_SAMPLING_RULES` JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SamplingRuleConfig {
    /// The sample rate to apply (0.0-1.0)
    pub sample_rate: f64,

    /// Optional service name pattern to match
    #[serde(default)]
    pub service: Option<String>,

    /// Optional operation name pattern to match
    #[serde(default)]
    pub name: Option<String>,
}

impl Display for SamplingRuleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", serde_json::json!(self))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedSamplingRules {
    pub rules: Vec<SamplingRuleConfig>,
}

impl FromStr for ParsedSamplingRules {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(ParsedSamplingRules::default());
        }
        // DD_TRACE_SAMPLING_RULES is a JSON array of SamplingRuleConfig objects
        let rules: Vec<SamplingRuleConfig> = serde_json::from_str(s)?;
        Ok(ParsedSamplingRules { rules })
    }
}

/// A sampling rule: match criteria, a sample rate, and the rule's own rate
/// limiter. Immutable once built; construction validates patterns and rates
/// and fails fast.
#[derive(Debug)]
pub struct SamplingRule {
    service_matcher: Option<GlobMatcher>,
    operation_matcher: Option<GlobMatcher>,
    sample_rate: f64,
    rate_sampler: RateSampler,
    rate_limiter: RateLimiter,
}

impl SamplingRule {
    /// Rule matching spans by service name, with the rate still in its
    /// configured string form.
    pub fn for_service(pattern: &str, rate: &str, rate_limit: f64) -> Result<Self> {
        Self::build(Some(pattern), None, parse_rate(rate)?, rate_limit)
    }

    /// Rule matching spans by operation name, with the rate still in its
    /// configured string form.
    pub fn for_operation(pattern: &str, rate: &str, rate_limit: f64) -> Result<Self> {
        Self::build(None, Some(pattern), parse_rate(rate)?, rate_limit)
    }

    /// The global catch-all rule applied when no other rule matches.
    pub fn match_all(sample_rate: f64, rate_limit: f64) -> Result<Self> {
        Self::build(None, None, sample_rate, rate_limit)
    }

    /// Rule built from an explicit [`SamplingRuleConfig`]; may constrain
    /// service and operation together.
    pub fn from_config(config: &SamplingRuleConfig, rate_limit: f64) -> Result<Self> {
        Self::build(
            config.service.as_deref(),
            config.name.as_deref(),
            config.sample_rate,
            rate_limit,
        )
    }

    fn build(
        service: Option<&str>,
        operation: Option<&str>,
        sample_rate: f64,
        rate_limit: f64,
    ) -> Result<Self> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(Error::InvalidSampleRate { rate: sample_rate });
        }
        if !rate_limit.is_finite() {
            return Err(Error::InvalidRateLimit { limit: rate_limit });
        }

        Ok(SamplingRule {
            service_matcher: service.map(matcher_from_pattern).transpose()?,
            operation_matcher: operation.map(matcher_from_pattern).transpose()?,
            sample_rate,
            rate_sampler: RateSampler::new(sample_rate),
            rate_limiter: RateLimiter::new(rate_limit),
        })
    }

    /// Checks if this rule matches the given span's service and operation
    /// names. A rule without matchers matches every span.
    pub fn matches(&self, span: &dyn Span) -> bool {
        if let Some(matcher) = &self.operation_matcher {
            if !matcher.matches(span.operation_name().as_ref()) {
                return false;
            }
        }
        if let Some(matcher) = &self.service_matcher {
            if !matcher.matches(span.service_name().as_ref()) {
                return false;
            }
        }
        true
    }

    /// Decides whether the trace is kept: the rate draw must keep it AND the
    /// rule's token bucket must have capacity. The bucket is only consulted
    /// (and drained) for traces the rate draw kept.
    pub fn sample(&self, trace_id: TraceId) -> bool {
        self.rate_sampler.sample(trace_id) && self.rate_limiter.is_allowed()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn effective_rate_limit(&self) -> f64 {
        self.rate_limiter.effective_rate()
    }
}

fn matcher_from_pattern(pattern: &str) -> Result<GlobMatcher> {
    if pattern.is_empty() {
        return Err(Error::InvalidRulePattern {
            pattern: pattern.to_string(),
        });
    }
    Ok(GlobMatcher::new(pattern))
}

fn parse_rate(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::UnparsableSampleRate {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_trace_api::span::testing::MockSpan;

    #[test]
    fn test_parse_rules_json() {
        let json = r#"
        [
            {"sample_rate": 0.5, "service": "web-api", "name": "http.request"},
            {"sample_rate": 0.1}
        ]
        "#;

        let parsed: ParsedSamplingRules = json.parse().unwrap();
        assert_eq!(parsed.rules.len(), 2);
        assert_eq!(parsed.rules[0].sample_rate, 0.5);
        assert_eq!(parsed.rules[0].service, Some("web-api".to_string()));
        assert_eq!(parsed.rules[0].name, Some("http.request".to_string()));
        assert_eq!(parsed.rules[1].sample_rate, 0.1);
        assert_eq!(parsed.rules[1].service, None);

        let empty: ParsedSamplingRules = "  ".parse().unwrap();
        assert!(empty.rules.is_empty());

        assert!("not json".parse::<ParsedSamplingRules>().is_err());
    }

    #[test]
    fn test_rule_validation_fails_fast() {
        assert!(matches!(
            SamplingRule::for_service("web-*", "1.5", 100.0),
            Err(Error::InvalidSampleRate { .. })
        ));
        assert!(matches!(
            SamplingRule::for_service("web-*", "-0.1", 100.0),
            Err(Error::InvalidSampleRate { .. })
        ));
        assert!(matches!(
            SamplingRule::for_service("web-*", "half", 100.0),
            Err(Error::UnparsableSampleRate { .. })
        ));
        assert!(matches!(
            SamplingRule::for_service("web-*", "", 100.0),
            Err(Error::UnparsableSampleRate { .. })
        ));
        assert!(matches!(
            SamplingRule::for_service("", "0.5", 100.0),
            Err(Error::InvalidRulePattern { .. })
        ));
        assert!(matches!(
            SamplingRule::match_all(0.5, f64::NAN),
            Err(Error::InvalidRateLimit { .. })
        ));

        assert!(SamplingRule::for_service("web-*", "0.5", 100.0).is_ok());
        assert!(SamplingRule::for_operation("http.request", "1", 100.0).is_ok());
        assert!(SamplingRule::match_all(0.0, 100.0).is_ok());
    }

    #[test]
    fn test_rule_matching_by_criteria() {
        let service_rule = SamplingRule::for_service("web-*", "1", 100.0).unwrap();
        let operation_rule = SamplingRule::for_operation("http.*", "1", 100.0).unwrap();
        let both = SamplingRule::from_config(
            &SamplingRuleConfig {
                sample_rate: 1.0,
                service: Some("web-api".to_string()),
                name: Some("http.request".to_string()),
            },
            100.0,
        )
        .unwrap();
        let catch_all = SamplingRule::match_all(1.0, 100.0).unwrap();

        let span = MockSpan::new(1)
            .with_service("web-api")
            .with_operation("http.request");
        assert!(service_rule.matches(&span));
        assert!(operation_rule.matches(&span));
        assert!(both.matches(&span));
        assert!(catch_all.matches(&span));

        let other = MockSpan::new(1)
            .with_service("billing")
            .with_operation("db.query");
        assert!(!service_rule.matches(&other));
        assert!(!operation_rule.matches(&other));
        assert!(!both.matches(&other));
        assert!(catch_all.matches(&other));

        // both criteria must hold for a combined rule
        let half = MockSpan::new(1)
            .with_service("web-api")
            .with_operation("db.query");
        assert!(!both.matches(&half));
    }

    #[test]
    fn test_rule_sampling_applies_rate_and_limit() {
        let keep_all = SamplingRule::match_all(1.0, 100.0).unwrap();
        let drop_all = SamplingRule::match_all(0.0, 100.0).unwrap();

        let trace_id = TraceId::from_u128(42);
        assert!(keep_all.sample(trace_id));
        assert!(!drop_all.sample(trace_id));

        // a kept rate draw is still subject to the rule's token bucket
        let limited = SamplingRule::match_all(1.0, 0.0).unwrap();
        assert!(!limited.sample(trace_id));
    }
}
