//! Pipeline configuration surface.
//!
//! Both configurations are externally mutable (e.g. from a settings screen)
//! and take effect starting with the next frame or update cycle.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Output quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingQuality {
    /// Fastest, lowest fidelity
    Low,
    /// Default trade-off
    #[default]
    Balanced,
    /// Highest fidelity
    High,
}

impl ProcessingQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingQuality::Low => "low",
            ProcessingQuality::Balanced => "balanced",
            ProcessingQuality::High => "high",
        }
    }
}

/// Frame-processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfiguration {
    /// Target processing rate in frames per second
    pub target_fps: u32,
    /// Maximum number of simultaneously tracked objects
    pub max_tracked_objects: usize,
    /// Minimum confidence for an observation to keep an object visible
    pub confidence_threshold: f64,
    /// Blend per-object confidence across consecutive frames
    pub enable_temporal_consistency: bool,
    /// Output quality tier
    pub processing_quality: ProcessingQuality,
}

impl Default for ProcessingConfiguration {
    fn default() -> Self {
        Self {
            target_fps: 30,
            max_tracked_objects: 5,
            confidence_threshold: 0.5,
            enable_temporal_consistency: true,
            processing_quality: ProcessingQuality::Balanced,
        }
    }
}

/// Lowest frame rate the degradation policy will settle on.
pub const MIN_TARGET_FPS: u32 = 5;

impl ProcessingConfiguration {
    /// Minimum interval between accepted frames.
    pub fn min_frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    /// Per-frame time budget: 80% of the frame interval.
    pub fn frame_time_budget(&self) -> Duration {
        self.min_frame_interval().mul_f64(0.8)
    }

    /// The configuration after one degradation step: frame rate and object
    /// capacity halved (with floors), temporal consistency off, quality low.
    pub fn degraded(&self) -> Self {
        Self {
            target_fps: (self.target_fps / 2).max(MIN_TARGET_FPS),
            max_tracked_objects: (self.max_tracked_objects / 2).max(1),
            confidence_threshold: self.confidence_threshold,
            enable_temporal_consistency: false,
            processing_quality: ProcessingQuality::Low,
        }
    }
}

/// Object-tracking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfiguration {
    /// Maximum mask-history and trajectory length per object
    pub max_trajectory_length: usize,
    /// Re-acquisition attempts before a lost object is discarded
    pub reacquisition_attempts: u32,
    /// Geometry blend weight toward the previous observation, in [0, 1]
    pub temporal_smoothing_factor: f64,
    /// Feed trajectories to the motion predictor
    pub motion_prediction_enabled: bool,
    /// Attempt to re-acquire lost objects each frame
    pub occlusion_handling_enabled: bool,
}

impl Default for TrackingConfiguration {
    fn default() -> Self {
        Self {
            max_trajectory_length: 30,
            reacquisition_attempts: 5,
            temporal_smoothing_factor: 0.7,
            motion_prediction_enabled: true,
            occlusion_handling_enabled: true,
        }
    }
}

impl TrackingConfiguration {
    /// Copy with the smoothing factor clamped into [0, 1] and a nonzero
    /// history bound.
    pub fn sanitized(&self) -> Self {
        Self {
            max_trajectory_length: self.max_trajectory_length.max(1),
            temporal_smoothing_factor: self.temporal_smoothing_factor.clamp(0.0, 1.0),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval() {
        let config = ProcessingConfiguration {
            target_fps: 30,
            ..Default::default()
        };
        let interval = config.min_frame_interval();
        assert!((interval.as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
        assert!((config.frame_time_budget().as_secs_f64() - 0.8 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_degraded_halves_with_floors() {
        let config = ProcessingConfiguration {
            target_fps: 15,
            max_tracked_objects: 5,
            ..Default::default()
        };
        let degraded = config.degraded();
        assert_eq!(degraded.target_fps, 7);
        assert_eq!(degraded.max_tracked_objects, 2);
        assert!(!degraded.enable_temporal_consistency);
        assert_eq!(degraded.processing_quality, ProcessingQuality::Low);

        // Floors hold under repeated degradation.
        let floor = degraded.degraded().degraded().degraded();
        assert_eq!(floor.target_fps, MIN_TARGET_FPS);
        assert_eq!(floor.max_tracked_objects, 1);
    }

    #[test]
    fn test_sanitized_clamps_smoothing() {
        let config = TrackingConfiguration {
            temporal_smoothing_factor: 1.8,
            max_trajectory_length: 0,
            ..Default::default()
        };
        let clean = config.sanitized();
        assert_eq!(clean.temporal_smoothing_factor, 1.0);
        assert_eq!(clean.max_trajectory_length, 1);
    }
}
