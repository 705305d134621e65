// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use dd_trace_api::sampling::{SamplingDecision, SamplingMechanism, SamplingPriority};
use dd_trace_api::span::Span;

/// Sampler returning a fixed decision, used when the operator forces the
/// sampling priority through configuration.
#[derive(Debug, Clone, Copy)]
pub struct ForcePrioritySampler {
    decision: SamplingDecision,
}

impl ForcePrioritySampler {
    pub fn new(priority: SamplingPriority, mechanism: SamplingMechanism) -> Self {
        ForcePrioritySampler {
            decision: SamplingDecision {
                priority,
                mechanism,
            },
        }
    }

    /// Stamps the forced decision on the span and keeps the trace iff the
    /// forced priority is a keep priority.
    pub fn sample(&self, span: &dyn Span) -> bool {
        span.set_sampling_decision(self.decision);
        self.decision.priority.is_keep()
    }
}
