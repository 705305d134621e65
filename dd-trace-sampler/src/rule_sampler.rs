// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use dd_trace_api::sampling::{mechanism, SamplingDecision, SamplingMechanism};
use dd_trace_api::span::Span;
use dd_trace_api::Result;

use crate::constants::limit::DEFAULT_TRACE_RATE_LIMIT;
use crate::rules::{ParsedSamplingRules, SamplingRule};

/// Sampler applying explicitly configured rules in precedence order.
///
/// Rules are consulted first-match-wins: explicit JSON rules, then operation
/// rules, then service rules. When none matches, the global catch-all rule
/// (present iff a global sample rate was configured) applies; without one the
/// trace is kept.
#[derive(Debug)]
pub struct RuleBasedSampler {
    /// Matching rules, in precedence order
    rules: Vec<SamplingRule>,

    /// Catch-all rule carrying the global sample rate
    global_rule: Option<SamplingRule>,
}

impl RuleBasedSampler {
    /// Builds the sampler from the raw configuration view.
    ///
    /// This is the only fallible sampler constructor: any malformed pattern,
    /// rate or rules JSON fails the whole build, and the selection policy
    /// falls back to accept-all.
    pub fn build(
        explicit_rules: Option<&str>,
        operation_rules: &[(String, String)],
        service_rules: &[(String, String)],
        trace_sample_rate: Option<f64>,
        trace_rate_limit: Option<f64>,
    ) -> Result<Self> {
        let rate_limit = trace_rate_limit.unwrap_or(DEFAULT_TRACE_RATE_LIMIT);

        let mut rules = Vec::new();
        if let Some(json) = explicit_rules {
            let parsed: ParsedSamplingRules = json.parse()?;
            for config in &parsed.rules {
                rules.push(SamplingRule::from_config(config, rate_limit)?);
            }
        }
        for (pattern, rate) in operation_rules {
            rules.push(SamplingRule::for_operation(pattern, rate, rate_limit)?);
        }
        for (pattern, rate) in service_rules {
            rules.push(SamplingRule::for_service(pattern, rate, rate_limit)?);
        }

        let global_rule = trace_sample_rate
            .map(|rate| SamplingRule::match_all(rate, rate_limit))
            .transpose()?;

        Ok(RuleBasedSampler { rules, global_rule })
    }

    pub fn sample(&self, span: &dyn Span) -> bool {
        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(span)) {
            return self.decide(span, rule, mechanism::LOCAL_TRACE_SAMPLING_RULE);
        }
        if let Some(rule) = &self.global_rule {
            return self.decide(span, rule, mechanism::LOCAL_TRACE_SAMPLING_RULE);
        }

        // no rule matched and no global rate: keep
        let mechanism = mechanism::DEFAULT;
        span.set_sampling_decision(SamplingDecision {
            priority: mechanism.to_priority(true),
            mechanism,
        });
        true
    }

    fn decide(&self, span: &dyn Span, rule: &SamplingRule, mechanism: SamplingMechanism) -> bool {
        let keep = rule.sample(span.trace_id());
        span.set_sampling_decision(SamplingDecision {
            priority: mechanism.to_priority(keep),
            mechanism,
        });
        keep
    }

    #[cfg(test)]
    pub(crate) fn rule_count(&self) -> usize {
        self.rules.len() + usize::from(self.global_rule.is_some())
    }
}
