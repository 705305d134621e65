// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::{Arc, OnceLock};

use crate::span::{Span, TraceId};

/// Checkpoint flags describing span lifecycle phases.
///
/// Flags combine with bitwise OR. `END` marks the closing half of a phase and
/// is always combined with exactly one of `SPAN`, `CPU` or `THREAD_MIGRATION`,
/// never emitted alone.
pub mod flags {
    pub const SPAN: u32 = 1 << 0;
    pub const CPU: u32 = 1 << 1;
    pub const THREAD_MIGRATION: u32 = 1 << 2;
    pub const END: u32 = 1 << 3;
}

/// Consumer of span lifecycle events, installed by the profiling pipeline.
pub trait Checkpointer: Send + Sync {
    /// Records a flagged lifecycle checkpoint for a span.
    fn checkpoint(&self, span: &dyn Span, flags: u32);

    /// Reports whether a root span's trace was published.
    fn on_root_span(&self, resource_name: &str, trace_id: TraceId, published: bool);
}

struct NoOpCheckpointer;

impl Checkpointer for NoOpCheckpointer {
    fn checkpoint(&self, _span: &dyn Span, _flags: u32) {}

    fn on_root_span(&self, _resource_name: &str, _trace_id: TraceId, _published: bool) {}
}

static NO_OP: NoOpCheckpointer = NoOpCheckpointer;

/// Forwards span lifecycle events to the registered [`Checkpointer`].
///
/// Starts out bound to a no-op sink; a real implementation is installed via
/// [`CheckpointRecorder::register`]. The sink slot is written exactly once for
/// the life of the recorder, and every method here is safe to call from any
/// number of span-producing threads. Checkpoints emitted while a registration
/// races are delivered to whichever sink the calling thread observes.
#[derive(Default)]
pub struct CheckpointRecorder {
    sink: OnceLock<Arc<dyn Checkpointer>>,
}

impl CheckpointRecorder {
    pub fn new() -> Self {
        CheckpointRecorder {
            sink: OnceLock::new(),
        }
    }

    /// Installs the checkpointer. The first registration wins; later calls
    /// leave the installed sink untouched.
    pub fn register(&self, checkpointer: Arc<dyn Checkpointer>) {
        if self.sink.set(checkpointer).is_err() {
            crate::dd_debug!("failed to register checkpointer, one is already registered");
        } else {
            crate::dd_debug!("registered checkpointer implementation");
        }
    }

    fn sink(&self) -> &dyn Checkpointer {
        match self.sink.get() {
            Some(sink) => sink.as_ref(),
            None => &NO_OP,
        }
    }

    /// Forwards a checkpoint unless the span is already excluded from export.
    pub fn checkpoint(&self, span: &dyn Span, flags: u32) {
        if !span.eligible_for_dropping() {
            self.sink().checkpoint(span, flags);
        }
    }

    pub fn on_start(&self, span: &dyn Span) {
        self.checkpoint(span, flags::SPAN);
    }

    pub fn on_start_work(&self, span: &dyn Span) {
        self.checkpoint(span, flags::CPU);
    }

    pub fn on_finish_work(&self, span: &dyn Span) {
        self.checkpoint(span, flags::CPU | flags::END);
    }

    pub fn on_start_thread_migration(&self, span: &dyn Span) {
        self.checkpoint(span, flags::THREAD_MIGRATION);
    }

    pub fn on_finish_thread_migration(&self, span: &dyn Span) {
        self.checkpoint(span, flags::THREAD_MIGRATION | flags::END);
    }

    pub fn on_finish(&self, span: &dyn Span) {
        self.checkpoint(span, flags::SPAN | flags::END);
    }

    /// Reports the publish outcome of a root span.
    ///
    /// A trace is only reported as published when the caller says so AND the
    /// span explicitly declared that it emits checkpoints; an absent flag is
    /// treated as false.
    pub fn on_root_span(&self, root: &dyn Span, published: bool) {
        let emitting_checkpoints = root.is_emitting_checkpoints().unwrap_or(false);
        self.sink().on_root_span(
            root.resource_name().as_ref(),
            root.trace_id(),
            published && emitting_checkpoints,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::span::testing::MockSpan;

    #[derive(Default)]
    struct RecordingCheckpointer {
        checkpoints: Mutex<Vec<(TraceId, u32)>>,
        root_spans: Mutex<Vec<(String, TraceId, bool)>>,
    }

    impl Checkpointer for RecordingCheckpointer {
        fn checkpoint(&self, span: &dyn Span, flags: u32) {
            self.checkpoints
                .lock()
                .unwrap()
                .push((span.trace_id(), flags));
        }

        fn on_root_span(&self, resource_name: &str, trace_id: TraceId, published: bool) {
            self.root_spans.lock().unwrap().push((
                resource_name.to_string(),
                trace_id,
                published,
            ));
        }
    }

    fn recorder_with_sink() -> (CheckpointRecorder, Arc<RecordingCheckpointer>) {
        let recorder = CheckpointRecorder::new();
        let sink = Arc::new(RecordingCheckpointer::default());
        recorder.register(sink.clone());
        (recorder, sink)
    }

    #[test]
    fn test_lifecycle_flag_composition() {
        let (recorder, sink) = recorder_with_sink();
        let span = MockSpan::new(7);

        recorder.on_start(&span);
        recorder.on_start_work(&span);
        recorder.on_finish_work(&span);
        recorder.on_start_thread_migration(&span);
        recorder.on_finish_thread_migration(&span);
        recorder.on_finish(&span);

        let flags_seen: Vec<u32> = sink
            .checkpoints
            .lock()
            .unwrap()
            .iter()
            .map(|(_, f)| *f)
            .collect();
        assert_eq!(
            flags_seen,
            vec![
                flags::SPAN,
                flags::CPU,
                flags::CPU | flags::END,
                flags::THREAD_MIGRATION,
                flags::THREAD_MIGRATION | flags::END,
                flags::SPAN | flags::END,
            ]
        );
    }

    #[test]
    fn test_checkpoints_suppressed_for_droppable_spans() {
        let (recorder, sink) = recorder_with_sink();
        let span = MockSpan::new(7).dropping(true);

        recorder.on_start(&span);
        recorder.on_start_work(&span);
        recorder.on_finish_work(&span);
        recorder.on_start_thread_migration(&span);
        recorder.on_finish_thread_migration(&span);
        recorder.on_finish(&span);
        recorder.checkpoint(&span, flags::SPAN);

        assert!(sink.checkpoints.lock().unwrap().is_empty());
    }

    #[test]
    fn test_no_sink_registered_drops_checkpoints() {
        let recorder = CheckpointRecorder::new();
        let span = MockSpan::new(7);

        // nothing to observe, this just must not panic
        recorder.on_start(&span);
        recorder.on_finish(&span);
        recorder.on_root_span(&span, true);
    }

    #[test]
    fn test_first_registration_wins() {
        let recorder = CheckpointRecorder::new();
        let first = Arc::new(RecordingCheckpointer::default());
        let second = Arc::new(RecordingCheckpointer::default());
        recorder.register(first.clone());
        recorder.register(second.clone());

        let span = MockSpan::new(7);
        recorder.on_start(&span);

        assert_eq!(first.checkpoints.lock().unwrap().len(), 1);
        assert!(second.checkpoints.lock().unwrap().is_empty());
    }

    #[test]
    fn test_root_span_publish_requires_explicit_emitting_flag() {
        for (published, emitting, expected) in [
            (true, Some(true), true),
            (true, Some(false), false),
            (true, None, false),
            (false, Some(true), false),
            (false, None, false),
        ] {
            let (recorder, sink) = recorder_with_sink();
            let span = MockSpan::new(7)
                .with_resource("GET /users")
                .emitting_checkpoints(emitting);

            recorder.on_root_span(&span, published);

            let root_spans = sink.root_spans.lock().unwrap();
            assert_eq!(
                root_spans.as_slice(),
                &[("GET /users".to_string(), TraceId::from_u128(7), expected)],
                "published={published} emitting={emitting:?}"
            );
        }
    }

    #[test]
    fn test_root_span_reported_even_for_droppable_spans() {
        let (recorder, sink) = recorder_with_sink();
        let span = MockSpan::new(7).dropping(true).emitting_checkpoints(Some(true));

        recorder.on_root_span(&span, true);

        // the publish outcome is always reported, only checkpoints are gated
        assert_eq!(sink.root_spans.lock().unwrap().len(), 1);
    }
}
