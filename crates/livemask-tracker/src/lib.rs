//! Temporal object tracking for the LiveMask pipeline.
//!
//! This crate provides:
//! - Weighted match scoring between tracked objects and mask observations
//! - Greedy per-frame association with temporal smoothing
//! - Lost-object bookkeeping and re-acquisition
//! - Constant-velocity motion prediction
//!
//! Everything here is synchronous; the orchestrator serializes access.

pub mod error;
pub mod matching;
pub mod motion;
pub mod tracker;

pub use error::{TrackerError, TrackerResult};
pub use matching::match_score;
pub use motion::MotionPredictor;
pub use tracker::{ObjectTracker, ReacquisitionOutcome, TrackingUpdate};
