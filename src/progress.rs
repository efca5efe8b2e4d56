//! Progress-callback trait for pipeline step events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::StudioConfigBuilder::progress_callback`] to receive
//! real-time events as an action (save, download, delete) walks its steps.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a progress bar, a status line, or a UI state flag
//! — without the library knowing anything about how the host application
//! communicates. It is also how a host disables the triggering control
//! while an action is in flight: flip the control off in
//! `on_action_start`, back on in `on_action_complete`.

use std::sync::Arc;

/// One step of a pipeline action, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    Validate,
    Capture,
    UploadThumbnail,
    UploadLogo,
    StoreSave,
    Export,
    StoreDelete,
}

impl PipelineStep {
    /// Human-readable label for progress displays.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStep::Validate => "Validating items",
            PipelineStep::Capture => "Capturing invoice",
            PipelineStep::UploadThumbnail => "Uploading thumbnail",
            PipelineStep::UploadLogo => "Uploading logo",
            PipelineStep::StoreSave => "Saving invoice",
            PipelineStep::Export => "Writing PDF",
            PipelineStep::StoreDelete => "Deleting invoice",
        }
    }
}

/// Called by the orchestrators as an action progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Steps within one action always fire sequentially;
/// implementations do not need their own synchronisation for ordering.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once when an action ("save", "download", "delete") starts.
    fn on_action_start(&self, action: &str) {
        let _ = action;
    }

    /// Called just before a step runs.
    fn on_step_start(&self, step: PipelineStep) {
        let _ = step;
    }

    /// Called when a step finishes successfully.
    fn on_step_complete(&self, step: PipelineStep) {
        let _ = step;
    }

    /// Called when a step fails; the action short-circuits after this.
    fn on_step_error(&self, step: PipelineStep, error: &str) {
        let _ = (step, error);
    }

    /// Called once when the action ends, successfully or not.
    fn on_action_complete(&self, action: &str, success: bool) {
        let _ = (action, success);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::StudioConfig`].
pub type PipelineProgress = Arc<dyn PipelineProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
    }

    impl PipelineProgressCallback for TrackingCallback {
        fn on_step_start(&self, _step: PipelineStep) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_step_complete(&self, _step: PipelineStep) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_step_error(&self, _step: PipelineStep, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_action_start("save");
        cb.on_step_start(PipelineStep::Capture);
        cb.on_step_complete(PipelineStep::Capture);
        cb.on_step_error(PipelineStep::StoreSave, "HTTP 503");
        cb.on_action_complete("save", false);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
        };
        tracker.on_step_start(PipelineStep::UploadThumbnail);
        tracker.on_step_complete(PipelineStep::UploadThumbnail);
        tracker.on_step_start(PipelineStep::UploadLogo);
        tracker.on_step_error(PipelineStep::UploadLogo, "HTTP 500");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: PipelineProgress = Arc::new(NoopProgressCallback);
        cb.on_action_start("download");
        cb.on_step_start(PipelineStep::Export);
    }

    #[test]
    fn labels_are_distinct() {
        let steps = [
            PipelineStep::Validate,
            PipelineStep::Capture,
            PipelineStep::UploadThumbnail,
            PipelineStep::UploadLogo,
            PipelineStep::StoreSave,
            PipelineStep::Export,
            PipelineStep::StoreDelete,
        ];
        let mut labels: Vec<_> = steps.iter().map(|s| s.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), steps.len());
    }
}
