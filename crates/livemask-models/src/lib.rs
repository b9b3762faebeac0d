//! Shared data models for the LiveMask segmentation pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Frames, masks, and prompts
//! - Tracked objects and their histories
//! - Processing and tracking configuration
//! - Device resource snapshots
//! - The pipeline event envelope

pub mod config;
pub mod event;
pub mod frame;
pub mod geometry;
pub mod mask;
pub mod object;
pub mod prompt;
pub mod resource;

// Re-export common types
pub use config::{ProcessingConfiguration, ProcessingQuality, TrackingConfiguration, MIN_TARGET_FPS};
pub use event::{EngineEvent, ErrorCategory};
pub use frame::{Frame, FrameBuffer, FrameMetadata};
pub use geometry::{BoundingBox, Point};
pub use mask::{Mask, MaskBuffer, ObjectId};
pub use object::{LostObjectRecord, SegmentedObject, TrackedObject};
pub use prompt::{Prompt, PromptId, PromptKind};
pub use resource::{MemoryPressure, ResourceSnapshot, ThermalState};
