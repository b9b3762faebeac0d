//! Frame intake throttling.
//!
//! Sits between the camera callback and the orchestrator. Performs only
//! flag checks on the capture thread, enforces a single in-flight frame,
//! and drops excess frames instead of queueing them.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::debug;

use livemask_models::FrameBuffer;

use crate::orchestrator::SegmentationOrchestrator;
use crate::prompts::PromptSource;

/// Log a dropped-frame diagnostic every this many drops.
const DROP_LOG_INTERVAL: u64 = 30;

/// Why a frame was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    Disabled,
    Busy,
    Throttled,
}

impl DropReason {
    fn as_str(&self) -> &'static str {
        match self {
            DropReason::Disabled => "disabled",
            DropReason::Busy => "busy",
            DropReason::Throttled => "throttled",
        }
    }
}

/// Clears the in-flight flag when the processing task finishes, whether it
/// completed, failed, or panicked.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Throttling gate in front of the orchestrator.
///
/// `handle_capture` is safe to call from a real-time capture context: it
/// never blocks and never allocates beyond the prompt snapshot of an
/// accepted frame. All further work runs on the async runtime.
pub struct FrameIntakeGate {
    orchestrator: Arc<SegmentationOrchestrator>,
    prompts: Arc<dyn PromptSource>,
    runtime: tokio::runtime::Handle,
    enabled: AtomicBool,
    in_flight: Arc<AtomicBool>,
    /// Nanoseconds since `base` of the last accepted frame; zero = never.
    last_accepted_nanos: AtomicU64,
    base: Instant,
    dropped: AtomicU64,
}

impl FrameIntakeGate {
    /// Create a gate dispatching onto the current tokio runtime.
    ///
    /// Must be called from within a runtime context.
    pub fn new(
        orchestrator: Arc<SegmentationOrchestrator>,
        prompts: Arc<dyn PromptSource>,
    ) -> Self {
        Self {
            orchestrator,
            prompts,
            runtime: tokio::runtime::Handle::current(),
            enabled: AtomicBool::new(true),
            in_flight: Arc::new(AtomicBool::new(false)),
            last_accepted_nanos: AtomicU64::new(0),
            base: Instant::now(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enable or disable frame intake.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Whether frame intake is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Whether a frame is currently being processed.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Total frames dropped so far.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Offer one camera frame to the pipeline.
    ///
    /// Discards immediately when intake is disabled, a frame is already in
    /// flight, or the target frame interval has not elapsed. A frame with
    /// no active prompts is discarded without marking failure. Otherwise
    /// the frame is dispatched asynchronously and the in-flight flag clears
    /// unconditionally when processing finishes.
    pub fn handle_capture(&self, buffer: FrameBuffer, timestamp: DateTime<Utc>) {
        if !self.enabled.load(Ordering::SeqCst) {
            self.record_drop(DropReason::Disabled);
            return;
        }

        if self.in_flight.load(Ordering::SeqCst) {
            self.record_drop(DropReason::Busy);
            return;
        }

        let now_nanos = self.base.elapsed().as_nanos() as u64;
        let last = self.last_accepted_nanos.load(Ordering::SeqCst);
        let min_interval = self.orchestrator.min_frame_interval().as_nanos() as u64;
        if last != 0 && now_nanos.saturating_sub(last) < min_interval {
            self.record_drop(DropReason::Throttled);
            return;
        }

        // Claim the single processing slot; a concurrent capture may have
        // taken it since the check above.
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            self.record_drop(DropReason::Busy);
            return;
        }
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        let prompts = self.prompts.snapshot();
        if prompts.is_empty() {
            // Nothing to segment; not a failure.
            drop(guard);
            return;
        }

        self.last_accepted_nanos.store(now_nanos, Ordering::SeqCst);

        let orchestrator = Arc::clone(&self.orchestrator);
        self.runtime.spawn(async move {
            let _guard = guard;
            match orchestrator.process_frame(buffer, timestamp, &prompts).await {
                Ok(frame) => {
                    if let Err(error) = orchestrator.update_tracking(&frame).await {
                        debug!(%error, "tracking update rejected");
                    }
                }
                Err(error) if error.is_soft() => {
                    debug!(%error, "frame skipped");
                }
                Err(error) => {
                    debug!(%error, "frame processing failed");
                }
            }
        });
    }

    fn record_drop(&self, reason: DropReason) {
        let total = self.dropped.fetch_add(1, Ordering::SeqCst) + 1;
        counter!("livemask_frames_dropped_total").increment(1);
        if total % DROP_LOG_INTERVAL == 1 {
            debug!(reason = reason.as_str(), total, "camera frame dropped");
        }
    }
}
