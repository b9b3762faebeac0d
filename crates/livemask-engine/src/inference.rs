//! Interface to the external segmentation model.

use std::time::Duration;

use async_trait::async_trait;

use livemask_models::{FrameBuffer, Mask, Prompt};

use crate::error::EngineResult;

/// Result of one inference call.
#[derive(Debug, Clone)]
pub struct InferenceOutput {
    /// One mask per segmented object
    pub masks: Vec<Mask>,
    /// Overall confidence reported by the model
    pub confidence: f64,
    /// Time spent inside the model
    pub inference_duration: Duration,
}

/// Opaque segmentation model.
///
/// Implementations wrap whatever runs the actual model (an on-device
/// runtime, a remote service, a test script). Calls are asynchronous and
/// fallible; the orchestrator imposes no hard timeout, only its pre-call
/// prompt-budget heuristic.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Load the model if it is not resident yet. Called lazily when a
    /// processing session starts; must be idempotent.
    async fn ensure_loaded(&self) -> EngineResult<()>;

    /// Whether the model is currently resident.
    fn is_loaded(&self) -> bool;

    /// Segment a frame using the given prompts.
    async fn segment(&self, buffer: &FrameBuffer, prompts: &[Prompt])
        -> EngineResult<InferenceOutput>;

    /// Release the model's memory. Best effort.
    async fn unload(&self);

    /// Resident model memory in bytes, zero when unloaded.
    fn memory_usage(&self) -> usize;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}
