//! Segmentation session orchestration.
//!
//! Owns the processing state machine: validates and adapts each frame,
//! invokes the inference engine, updates tracking, maintains rolling
//! performance statistics, and self-degrades configuration under sustained
//! failure, thermal, or memory pressure.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use livemask_models::{
    Frame, FrameBuffer, FrameMetadata, ObjectId, ProcessingConfiguration, Prompt, SegmentedObject,
    ThermalState, TrackedObject, TrackingConfiguration,
};
use livemask_tracker::{ObjectTracker, ReacquisitionOutcome};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::EventChannel;
use crate::inference::InferenceEngine;
use crate::monitor::ResourceMonitor;
use crate::stats::PerformanceStats;

/// Consecutive inference failures that trigger one degradation step.
const CONSECUTIVE_FAILURE_LIMIT: u32 = 3;

/// Fraction of the frame-time budget at which prompt shedding starts.
const BUDGET_PRESSURE_RATIO: f64 = 0.9;

/// Processing session lifecycle state.
///
/// Camera switching is a transient operation within `Running`, not a state
/// of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No session yet
    Idle,
    /// Model loading in progress
    Starting,
    /// Processing frames at full configuration
    Running,
    /// Processing frames with a self-reduced configuration
    Degraded,
    /// Session ended
    Stopped,
}

impl EngineState {
    /// Whether frames are accepted in this state.
    pub fn is_processing(&self) -> bool {
        matches!(self, EngineState::Running | EngineState::Degraded)
    }
}

/// Orchestrates a live segmentation session.
///
/// Shared behind an `Arc`; every method takes `&self`. The tracker is
/// serialized behind an async mutex, counters are atomics, and no lock is
/// held across the inference await.
pub struct SegmentationOrchestrator {
    engine: Arc<dyn InferenceEngine>,
    monitor: Arc<dyn ResourceMonitor>,
    events: EventChannel,
    state: Mutex<EngineState>,
    processing: Mutex<ProcessingConfiguration>,
    tracking: Mutex<TrackingConfiguration>,
    /// Derived from `processing.target_fps`; kept in sync by the setters so
    /// the intake gate can read it without locking.
    min_interval_nanos: AtomicU64,
    tracker: tokio::sync::Mutex<ObjectTracker>,
    stats: Mutex<PerformanceStats>,
    sequence: AtomicU64,
    consecutive_failures: AtomicU32,
    last_accepted: Mutex<Option<Instant>>,
    /// Per-object confidence from the previous update cycle, for the
    /// temporal-consistency blend.
    previous_confidences: Mutex<HashMap<ObjectId, f64>>,
    /// Ids visible after the previous update cycle, for loss diffing.
    visible_ids: Mutex<HashSet<ObjectId>>,
}

impl SegmentationOrchestrator {
    /// Create an orchestrator in the `Idle` state.
    pub fn new(
        config: EngineConfig,
        engine: Arc<dyn InferenceEngine>,
        monitor: Arc<dyn ResourceMonitor>,
    ) -> Self {
        let tracker = ObjectTracker::new(
            config.tracking.clone(),
            config.processing.max_tracked_objects,
            config.processing.confidence_threshold,
        );
        let min_interval_nanos =
            AtomicU64::new(config.processing.min_frame_interval().as_nanos() as u64);

        Self {
            engine,
            monitor,
            events: EventChannel::new(),
            state: Mutex::new(EngineState::Idle),
            processing: Mutex::new(config.processing),
            tracking: Mutex::new(config.tracking),
            min_interval_nanos,
            tracker: tokio::sync::Mutex::new(tracker),
            stats: Mutex::new(PerformanceStats::new()),
            sequence: AtomicU64::new(0),
            consecutive_failures: AtomicU32::new(0),
            last_accepted: Mutex::new(None),
            previous_confidences: Mutex::new(HashMap::new()),
            visible_ids: Mutex::new(HashSet::new()),
        }
    }

    /// Event channel for UI and diagnostics subscribers.
    pub fn events(&self) -> &EventChannel {
        &self.events
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        *self.state.lock().unwrap()
    }

    /// Whether frames are currently accepted.
    pub fn is_processing(&self) -> bool {
        self.state().is_processing()
    }

    /// Snapshot of the processing configuration.
    pub fn processing_config(&self) -> ProcessingConfiguration {
        self.processing.lock().unwrap().clone()
    }

    /// Snapshot of the tracking configuration.
    pub fn tracking_config(&self) -> TrackingConfiguration {
        self.tracking.lock().unwrap().clone()
    }

    /// Replace the processing configuration and recompute the derived
    /// frame interval in the same call. Takes effect from the next frame.
    pub fn set_processing_config(&self, config: ProcessingConfiguration) {
        let mut current = self.processing.lock().unwrap();
        self.min_interval_nanos
            .store(config.min_frame_interval().as_nanos() as u64, Ordering::SeqCst);
        debug!(?config, "processing configuration replaced");
        *current = config;
    }

    /// Replace the tracking configuration. Takes effect from the next
    /// update cycle.
    pub fn set_tracking_config(&self, config: TrackingConfiguration) {
        *self.tracking.lock().unwrap() = config.sanitized();
    }

    /// Minimum interval between accepted frames, for the intake gate.
    pub fn min_frame_interval(&self) -> Duration {
        Duration::from_nanos(self.min_interval_nanos.load(Ordering::SeqCst))
    }

    /// Most recently computed FPS value.
    pub fn current_fps(&self) -> f64 {
        self.stats.lock().unwrap().current_fps()
    }

    /// Rolling average processing time.
    pub fn average_processing_time(&self) -> Option<Duration> {
        self.stats.lock().unwrap().average_processing_time()
    }

    /// Start a processing session, lazily loading the model.
    pub async fn start_processing(&self) -> EngineResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            if state.is_processing() {
                debug!("start requested while already processing");
                return Ok(());
            }
            *state = EngineState::Starting;
        }

        if let Err(error) = self.engine.ensure_loaded().await {
            warn!(%error, engine = self.engine.name(), "model load failed");
            *self.state.lock().unwrap() = EngineState::Stopped;
            return Err(error);
        }

        self.sequence.store(0, Ordering::SeqCst);
        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.stats.lock().unwrap().reset();
        *self.last_accepted.lock().unwrap() = None;

        *self.state.lock().unwrap() = EngineState::Running;
        info!(engine = self.engine.name(), "processing started");
        self.events.started();
        Ok(())
    }

    /// Stop the session and clear all tracked objects. An in-flight
    /// inference call is not cancelled; subsequent frames are rejected.
    pub async fn stop_processing(&self) {
        *self.state.lock().unwrap() = EngineState::Stopped;

        let removed = self.tracker.lock().await.clear_all();
        self.forget_objects(&removed);
        for id in removed {
            self.events.object_removed(id);
        }

        info!("processing stopped");
        self.events.stopped();
    }

    /// Full logical restart: clear tracker state and rolling statistics
    /// without changing the lifecycle state.
    pub async fn reset(&self) {
        let removed = self.tracker.lock().await.clear_all();
        self.forget_objects(&removed);
        for id in removed {
            self.events.object_removed(id);
        }

        self.sequence.store(0, Ordering::SeqCst);
        self.consecutive_failures.store(0, Ordering::SeqCst);
        self.stats.lock().unwrap().reset();
        *self.last_accepted.lock().unwrap() = None;
        info!("pipeline reset");
    }

    /// A viewpoint change invalidates position assumptions: clear tracker
    /// state and the failure counter, but keep FPS and processing-time
    /// statistics so continuity metrics are not disrupted.
    pub async fn handle_camera_switch(&self) {
        let removed = self.tracker.lock().await.handle_camera_switch();
        self.forget_objects(&removed);
        for id in removed {
            self.events.object_removed(id);
        }
        self.consecutive_failures.store(0, Ordering::SeqCst);
        info!("camera switched, tracking state cleared");
    }

    /// Process one frame through the inference engine.
    ///
    /// Validation failures are returned synchronously; inference failures
    /// are counted toward the degradation policy and also reported on the
    /// event channel.
    pub async fn process_frame(
        &self,
        buffer: FrameBuffer,
        timestamp: DateTime<Utc>,
        prompts: &[Prompt],
    ) -> EngineResult<Frame> {
        let state = self.state();
        if !state.is_processing() {
            return Err(EngineError::InvalidState(state));
        }
        let started = Instant::now();

        {
            let mut last = self.last_accepted.lock().unwrap();
            if let Some(previous) = *last {
                if started.duration_since(previous) < self.min_frame_interval() {
                    return Err(EngineError::FrameRateExceeded);
                }
            }
            *last = Some(started);
        }

        if buffer.is_degenerate() {
            return Err(EngineError::invalid_frame(format!(
                "degenerate dimensions {}x{}",
                buffer.width, buffer.height
            )));
        }

        let config = self.processing_config();
        if prompts.len() > config.max_tracked_objects {
            return Err(EngineError::PromptLimitExceeded {
                count: prompts.len(),
                limit: config.max_tracked_objects,
            });
        }

        let resources = self.monitor.snapshot();
        if resources.thermal == ThermalState::Critical {
            return Err(EngineError::ThermalThrottling);
        }

        let adapted = self.adapt_prompts(prompts, &config);

        let output = match self.engine.segment(&buffer, &adapted).await {
            Ok(output) => output,
            Err(error) => {
                self.record_failure(&error);
                return Err(error);
            }
        };

        self.consecutive_failures.store(0, Ordering::SeqCst);
        let processing_time = started.elapsed();
        let frame = Frame {
            buffer,
            timestamp,
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            masks: output.masks,
            metadata: FrameMetadata {
                processing_time,
                inference_time: output.inference_duration,
                resources,
            },
        };

        self.stats.lock().unwrap().record_frame(processing_time);
        counter!("livemask_frames_processed_total").increment(1);
        histogram!("livemask_frame_processing_seconds").record(processing_time.as_secs_f64());

        self.events.frame_processed(&frame);
        Ok(frame)
    }

    /// Update tracking from a processed frame and publish the results.
    pub async fn update_tracking(&self, frame: &Frame) -> EngineResult<Vec<TrackedObject>> {
        let state = self.state();
        if !state.is_processing() {
            return Err(EngineError::InvalidState(state));
        }

        let config = self.processing_config();
        let update = {
            let mut tracker = self.tracker.lock().await;
            tracker.set_processing_limits(config.max_tracked_objects, config.confidence_threshold);
            tracker.set_config(self.tracking_config());
            tracker.update(frame)
        };

        let mut objects = update.objects;

        // Additional smoothing pass: average each object's confidence with
        // its value from the previous cycle.
        if config.enable_temporal_consistency {
            let mut previous = self.previous_confidences.lock().unwrap();
            for object in &mut objects {
                if let Some(prior) = previous.get(&object.id) {
                    object.confidence = (prior + object.confidence) / 2.0;
                }
                previous.insert(object.id, object.confidence);
            }
        }

        objects.retain(|object| object.confidence >= config.confidence_threshold);

        // Surface objects that dropped out of the visible set, whether the
        // tracker lost them or the threshold filtered them.
        let current_ids: HashSet<ObjectId> = objects.iter().map(|object| object.id).collect();
        let mut lost_ids: HashSet<ObjectId> = update.lost.iter().copied().collect();
        {
            let mut visible = self.visible_ids.lock().unwrap();
            for id in visible.difference(&current_ids) {
                lost_ids.insert(*id);
            }
            *visible = current_ids;
        }
        for id in lost_ids {
            self.events.object_lost(id);
        }
        for id in &update.reacquired {
            self.events.object_reacquired(*id);
        }
        for id in &update.removed {
            self.previous_confidences.lock().unwrap().remove(id);
            self.events.object_removed(*id);
        }

        self.events.tracking_updated(objects.clone());
        Ok(objects)
    }

    /// Seed tracking with freshly segmented objects.
    pub async fn initialize_tracking(
        &self,
        seeds: &[SegmentedObject],
    ) -> EngineResult<Vec<TrackedObject>> {
        let config = self.processing_config();
        let objects = {
            let mut tracker = self.tracker.lock().await;
            tracker.set_processing_limits(config.max_tracked_objects, config.confidence_threshold);
            tracker.initialize_tracking(seeds)?
        };

        {
            let mut previous = self.previous_confidences.lock().unwrap();
            let mut visible = self.visible_ids.lock().unwrap();
            previous.clear();
            visible.clear();
            for object in &objects {
                previous.insert(object.id, object.confidence);
                visible.insert(object.id);
            }
        }

        self.events.tracking_updated(objects.clone());
        Ok(objects)
    }

    /// On-demand re-acquisition of a single lost object.
    pub async fn attempt_reacquisition(
        &self,
        id: &ObjectId,
        frame: &Frame,
    ) -> EngineResult<ReacquisitionOutcome> {
        let outcome = self.tracker.lock().await.attempt_reacquisition(id, frame)?;
        match &outcome {
            ReacquisitionOutcome::Reacquired(_) => self.events.object_reacquired(*id),
            ReacquisitionOutcome::Expired => self.events.object_removed(*id),
            ReacquisitionOutcome::Pending(_) => {}
        }
        Ok(outcome)
    }

    /// Remove one object explicitly.
    pub async fn remove_object(&self, id: &ObjectId) -> bool {
        let removed = self.tracker.lock().await.remove_object(id);
        if removed {
            self.forget_objects(std::slice::from_ref(id));
            self.events.object_removed(*id);
        }
        removed
    }

    /// Remove all objects explicitly.
    pub async fn clear_all_objects(&self) {
        let removed = self.tracker.lock().await.clear_all();
        self.forget_objects(&removed);
        for id in removed {
            self.events.object_removed(id);
        }
    }

    /// Snapshot of the currently tracked objects.
    pub async fn tracked_objects(&self) -> Vec<TrackedObject> {
        self.tracker.lock().await.objects()
    }

    /// React to a platform thermal-state change.
    pub async fn handle_thermal_state_change(&self, thermal: ThermalState) {
        match thermal {
            ThermalState::Serious => {
                let mut config = self.processing.lock().unwrap();
                let reduced = config.target_fps - config.target_fps / 3;
                warn!(
                    from = config.target_fps,
                    to = reduced,
                    "thermal pressure, reducing target frame rate"
                );
                config.target_fps = reduced.max(1);
                self.min_interval_nanos.store(
                    config.min_frame_interval().as_nanos() as u64,
                    Ordering::SeqCst,
                );
            }
            ThermalState::Critical => {
                warn!("thermal state critical, stopping processing");
                self.events.error(
                    livemask_models::ErrorCategory::ThermalThrottling,
                    "thermal state critical",
                );
                self.stop_processing().await;
            }
            ThermalState::Nominal | ThermalState::Fair => {}
        }
    }

    /// React to a platform memory-pressure notification: shed the
    /// processing-time history and halve the object capacity.
    pub fn handle_memory_pressure(&self) {
        self.stats.lock().unwrap().clear_processing_times();
        let mut config = self.processing.lock().unwrap();
        config.max_tracked_objects = (config.max_tracked_objects / 2).max(1);
        warn!(
            max_tracked_objects = config.max_tracked_objects,
            "memory pressure, shedding history and capacity"
        );
        self.events.error(
            livemask_models::ErrorCategory::MemoryPressure,
            "memory pressure shedding applied",
        );
    }

    /// Truncate the prompt set to the most recent half when the rolling
    /// average processing time crowds the frame budget. A quality/latency
    /// trade-off, not an error.
    fn adapt_prompts(&self, prompts: &[Prompt], config: &ProcessingConfiguration) -> Vec<Prompt> {
        let Some(average) = self.average_processing_time() else {
            return prompts.to_vec();
        };
        let budget = config.frame_time_budget();
        if average.as_secs_f64() < BUDGET_PRESSURE_RATIO * budget.as_secs_f64() {
            return prompts.to_vec();
        }

        let keep = (config.max_tracked_objects / 2).max(1);
        if prompts.len() <= keep {
            return prompts.to_vec();
        }

        let mut adapted = prompts.to_vec();
        adapted.sort_by_key(|prompt| prompt.created_at);
        let adapted: Vec<Prompt> = adapted.split_off(adapted.len() - keep);
        debug!(
            from = prompts.len(),
            to = adapted.len(),
            "prompt set truncated under time pressure"
        );
        counter!("livemask_prompts_shed_total").increment(1);
        adapted
    }

    /// Count an inference failure and degrade configuration after a run of
    /// them. Never panics the pipeline.
    fn record_failure(&self, error: &EngineError) {
        counter!("livemask_frames_failed_total").increment(1);
        self.events.error(error.category(), error.to_string());

        let failures = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
        if failures >= CONSECUTIVE_FAILURE_LIMIT {
            self.consecutive_failures.store(0, Ordering::SeqCst);
            self.degrade();
        }
    }

    /// Apply one degradation step and enter the `Degraded` state.
    fn degrade(&self) {
        {
            let mut config = self.processing.lock().unwrap();
            let degraded = config.degraded();
            warn!(
                target_fps = degraded.target_fps,
                max_tracked_objects = degraded.max_tracked_objects,
                "sustained failures, degrading configuration"
            );
            self.min_interval_nanos.store(
                degraded.min_frame_interval().as_nanos() as u64,
                Ordering::SeqCst,
            );
            *config = degraded;
        }

        let mut state = self.state.lock().unwrap();
        if state.is_processing() {
            *state = EngineState::Degraded;
        }
    }

    /// Drop per-object bookkeeping for removed ids.
    fn forget_objects(&self, ids: &[ObjectId]) {
        let mut previous = self.previous_confidences.lock().unwrap();
        let mut visible = self.visible_ids.lock().unwrap();
        for id in ids {
            previous.remove(id);
            visible.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::InferenceOutput;
    use crate::monitor::StaticMonitor;
    use async_trait::async_trait;
    use livemask_models::Point;

    struct NullEngine;

    #[async_trait]
    impl InferenceEngine for NullEngine {
        async fn ensure_loaded(&self) -> EngineResult<()> {
            Ok(())
        }

        fn is_loaded(&self) -> bool {
            true
        }

        async fn segment(
            &self,
            _buffer: &FrameBuffer,
            _prompts: &[Prompt],
        ) -> EngineResult<InferenceOutput> {
            Ok(InferenceOutput {
                masks: Vec::new(),
                confidence: 1.0,
                inference_duration: Duration::from_millis(1),
            })
        }

        async fn unload(&self) {}

        fn memory_usage(&self) -> usize {
            0
        }

        fn name(&self) -> &'static str {
            "null"
        }
    }

    fn orchestrator() -> SegmentationOrchestrator {
        SegmentationOrchestrator::new(
            EngineConfig::default(),
            Arc::new(NullEngine),
            Arc::new(StaticMonitor::new()),
        )
    }

    fn prompt_with_offset(millis: i64) -> Prompt {
        let mut prompt = Prompt::point(Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        prompt.created_at += chrono::Duration::milliseconds(millis);
        prompt
    }

    #[test]
    fn test_state_processing_predicate() {
        assert!(EngineState::Running.is_processing());
        assert!(EngineState::Degraded.is_processing());
        assert!(!EngineState::Starting.is_processing());
        assert!(!EngineState::Stopped.is_processing());
    }

    #[test]
    fn test_adapt_prompts_passthrough_without_samples() {
        let orch = orchestrator();
        let prompts: Vec<Prompt> = (0..5).map(|i| prompt_with_offset(i)).collect();
        let adapted = orch.adapt_prompts(&prompts, &orch.processing_config());
        assert_eq!(adapted.len(), 5);
    }

    #[test]
    fn test_adapt_prompts_truncates_under_time_pressure() {
        let orch = orchestrator();
        // Default 30 fps: budget is ~26.7ms, so a 30ms average exceeds the
        // 90% pressure mark.
        {
            let mut stats = orch.stats.lock().unwrap();
            for _ in 0..10 {
                stats.record_frame(Duration::from_millis(30));
            }
        }

        let prompts: Vec<Prompt> = (0..5).map(|i| prompt_with_offset(i * 10)).collect();
        let adapted = orch.adapt_prompts(&prompts, &orch.processing_config());

        // max(1, 5 / 2) = 2 most recent prompts survive.
        assert_eq!(adapted.len(), 2);
        assert_eq!(adapted[0].id, prompts[3].id);
        assert_eq!(adapted[1].id, prompts[4].id);
    }

    #[test]
    fn test_memory_pressure_halves_capacity_and_sheds_history() {
        let orch = orchestrator();
        orch.stats
            .lock()
            .unwrap()
            .record_frame(Duration::from_millis(10));

        orch.handle_memory_pressure();
        assert_eq!(orch.processing_config().max_tracked_objects, 2);
        assert_eq!(orch.average_processing_time(), None);

        // Floor of one object.
        orch.handle_memory_pressure();
        orch.handle_memory_pressure();
        assert_eq!(orch.processing_config().max_tracked_objects, 1);
    }

    #[test]
    fn test_config_setter_updates_derived_interval() {
        let orch = orchestrator();
        let mut config = orch.processing_config();
        config.target_fps = 10;
        orch.set_processing_config(config);
        assert_eq!(orch.min_frame_interval(), Duration::from_secs_f64(0.1));
    }
}
