//! Frame-processing orchestration for live segmentation.
//!
//! This crate provides:
//! - The segmentation session state machine with adaptive degradation
//! - Frame intake throttling with a single-in-flight invariant
//! - The inference-engine, prompt-source, and resource-monitor seams
//! - Broadcast event delivery to UI and diagnostics subscribers
//! - Rolling FPS and processing-time statistics

pub mod config;
pub mod error;
pub mod events;
pub mod gate;
pub mod inference;
pub mod monitor;
pub mod orchestrator;
pub mod prompts;
pub mod stats;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use events::EventChannel;
pub use gate::FrameIntakeGate;
pub use inference::{InferenceEngine, InferenceOutput};
pub use monitor::{ResourceMonitor, StaticMonitor};
pub use orchestrator::{EngineState, SegmentationOrchestrator};
pub use prompts::{PromptSource, StaticPromptSource};
pub use stats::PerformanceStats;
