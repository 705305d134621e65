// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::fmt;

use crate::sampling::{SamplingDecision, SamplingPriority};

/// A 128 bit trace identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    pub const fn from_u128(id: u128) -> Self {
        TraceId(id)
    }

    pub fn to_u128(self) -> u128 {
        self.0
    }

    /// The low 64 bits of the id, used as the input of deterministic
    /// hash-based sampling.
    pub fn lower_64bits(self) -> u64 {
        self.0 as u64
    }
}

impl From<u128> for TraceId {
    fn from(id: u128) -> Self {
        TraceId(id)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// The view of a span consumed by the sampling and checkpoint layers.
///
/// Implementations are read from many threads concurrently; the only write,
/// `set_sampling_decision`, goes through interior mutability so samplers can
/// stamp a shared span.
pub trait Span {
    fn trace_id(&self) -> TraceId;

    fn service_name(&self) -> Cow<'_, str>;

    fn operation_name(&self) -> Cow<'_, str>;

    fn resource_name(&self) -> Cow<'_, str>;

    /// Whether upstream logic already decided to discard this span. Checkpoint
    /// recording is suppressed for such spans.
    fn eligible_for_dropping(&self) -> bool;

    /// Tri-state: `None` when the instrumentation has not declared whether the
    /// span emits checkpoints.
    fn is_emitting_checkpoints(&self) -> Option<bool>;

    fn sampling_priority(&self) -> Option<SamplingPriority>;

    fn set_sampling_decision(&self, decision: SamplingDecision);
}

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! A span double for tests of the sampling and checkpoint layers.

    use std::borrow::Cow;
    use std::sync::Mutex;

    use super::{Span, TraceId};
    use crate::sampling::{SamplingDecision, SamplingPriority};

    pub struct MockSpan {
        trace_id: TraceId,
        service: String,
        operation: String,
        resource: String,
        eligible_for_dropping: bool,
        emitting_checkpoints: Option<bool>,
        decision: Mutex<Option<SamplingDecision>>,
    }

    impl MockSpan {
        pub fn new(trace_id: u128) -> Self {
            MockSpan {
                trace_id: TraceId::from_u128(trace_id),
                service: "test-service".to_string(),
                operation: "test.operation".to_string(),
                resource: "test-resource".to_string(),
                eligible_for_dropping: false,
                emitting_checkpoints: None,
                decision: Mutex::new(None),
            }
        }

        pub fn with_service(mut self, service: &str) -> Self {
            self.service = service.to_string();
            self
        }

        pub fn with_operation(mut self, operation: &str) -> Self {
            self.operation = operation.to_string();
            self
        }

        pub fn with_resource(mut self, resource: &str) -> Self {
            self.resource = resource.to_string();
            self
        }

        pub fn dropping(mut self, eligible: bool) -> Self {
            self.eligible_for_dropping = eligible;
            self
        }

        pub fn emitting_checkpoints(mut self, emitting: Option<bool>) -> Self {
            self.emitting_checkpoints = emitting;
            self
        }

        /// The decision stamped by the last sampler that saw this span.
        pub fn stamped_decision(&self) -> Option<SamplingDecision> {
            *self.decision.lock().unwrap()
        }
    }

    impl Span for MockSpan {
        fn trace_id(&self) -> TraceId {
            self.trace_id
        }

        fn service_name(&self) -> Cow<'_, str> {
            Cow::Borrowed(&self.service)
        }

        fn operation_name(&self) -> Cow<'_, str> {
            Cow::Borrowed(&self.operation)
        }

        fn resource_name(&self) -> Cow<'_, str> {
            Cow::Borrowed(&self.resource)
        }

        fn eligible_for_dropping(&self) -> bool {
            self.eligible_for_dropping
        }

        fn is_emitting_checkpoints(&self) -> Option<bool> {
            self.emitting_checkpoints
        }

        fn sampling_priority(&self) -> Option<SamplingPriority> {
            self.decision.lock().unwrap().map(|d| d.priority)
        }

        fn set_sampling_decision(&self, decision: SamplingDecision) {
            *self.decision.lock().unwrap() = Some(decision);
        }
    }
}
