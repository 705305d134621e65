// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use dd_trace_api::configuration::Config;
use dd_trace_api::sampling::{mechanism, priority};
use dd_trace_api::span::Span;
use dd_trace_api::{dd_debug, dd_error};

use crate::constants::force;
use crate::priority_sampler::ForcePrioritySampler;
use crate::rate_by_service::RateByServiceSampler;
use crate::rule_sampler::RuleBasedSampler;

/// Sampler keeping every trace. The universal, always-correct baseline and
/// the fallback of every configuration error path.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllSampler;

impl AllSampler {
    pub fn sample(&self, _span: &dyn Span) -> bool {
        true
    }
}

/// The closed set of sampling strategies. Exactly one variant is active per
/// tracer instance, chosen once at startup by [`Sampler::for_config`] and
/// shared by reference afterwards: decisions never change strategy at
/// runtime, only the internal counters of the active variant move.
#[derive(Debug)]
pub enum Sampler {
    AcceptAll(AllSampler),
    ForcedPriority(ForcePrioritySampler),
    RateByService(RateByServiceSampler),
    RuleBased(RuleBasedSampler),
}

impl Sampler {
    /// Chooses the sampling strategy for a configuration.
    ///
    /// Total: every configuration shape maps to a usable sampler, including
    /// the error path. Explicit rate/rule configuration is the most specific
    /// intent and wins; the forced priority escape hatch is checked before
    /// the adaptive default; and a configuration that fails to build a
    /// rule-based sampler degrades to sampling everything rather than
    /// silently disabling tracing.
    pub fn for_config(config: Option<&Config>) -> Sampler {
        let Some(config) = config else {
            return Sampler::AcceptAll(AllSampler);
        };

        let has_rule_configuration = !config.trace_sampling_service_rules().is_empty()
            || !config.trace_sampling_operation_rules().is_empty()
            || config.trace_sampling_rules().is_some()
            || config.trace_sample_rate().is_some();

        if has_rule_configuration {
            match RuleBasedSampler::build(
                config.trace_sampling_rules(),
                config.trace_sampling_operation_rules(),
                config.trace_sampling_service_rules(),
                config.trace_sample_rate(),
                config.trace_rate_limit(),
            ) {
                Ok(sampler) => Sampler::RuleBased(sampler),
                Err(error) => {
                    dd_error!("invalid sampler configuration, using AllSampler: {}", error);
                    Sampler::AcceptAll(AllSampler)
                }
            }
        } else if config.priority_sampling_enabled() {
            match config.priority_sampling_force() {
                Some(forced) if forced.eq_ignore_ascii_case(force::KEEP) => {
                    dd_debug!("forcing sampling priority to keep");
                    Sampler::ForcedPriority(ForcePrioritySampler::new(
                        priority::AUTO_KEEP,
                        mechanism::DEFAULT,
                    ))
                }
                Some(forced) if forced.eq_ignore_ascii_case(force::DROP) => {
                    dd_debug!("forcing sampling priority to drop");
                    Sampler::ForcedPriority(ForcePrioritySampler::new(
                        priority::AUTO_REJECT,
                        mechanism::DEFAULT,
                    ))
                }
                _ => Sampler::RateByService(RateByServiceSampler::new()),
            }
        } else {
            Sampler::AcceptAll(AllSampler)
        }
    }

    /// Decides whether the trace rooted at `span` is kept. Called once per
    /// completed local trace, from any number of trace-finishing threads.
    pub fn sample(&self, span: &dyn Span) -> bool {
        match self {
            Sampler::AcceptAll(sampler) => sampler.sample(span),
            Sampler::ForcedPriority(sampler) => sampler.sample(span),
            Sampler::RateByService(sampler) => sampler.sample(span),
            Sampler::RuleBased(sampler) => sampler.sample(span),
        }
    }

    /// Forwards agent-provided per-key target rates to the rate-by-service
    /// sampler. A no-op for every other variant.
    pub fn update_service_rates(&self, rates: HashMap<String, f64>) {
        if let Sampler::RateByService(sampler) = self {
            sampler.update_rates(rates);
        }
    }
}
