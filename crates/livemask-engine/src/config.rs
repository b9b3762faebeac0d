//! Engine configuration.

use livemask_models::{ProcessingConfiguration, TrackingConfiguration};

/// Aggregate configuration for a processing session.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Frame-processing configuration
    pub processing: ProcessingConfiguration,
    /// Object-tracking configuration
    pub tracking: TrackingConfiguration,
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            processing: ProcessingConfiguration {
                target_fps: env_parse("LIVEMASK_TARGET_FPS", defaults.processing.target_fps),
                max_tracked_objects: env_parse(
                    "LIVEMASK_MAX_OBJECTS",
                    defaults.processing.max_tracked_objects,
                ),
                confidence_threshold: env_parse(
                    "LIVEMASK_CONFIDENCE_THRESHOLD",
                    defaults.processing.confidence_threshold,
                ),
                enable_temporal_consistency: env_parse(
                    "LIVEMASK_TEMPORAL_CONSISTENCY",
                    defaults.processing.enable_temporal_consistency,
                ),
                processing_quality: defaults.processing.processing_quality,
            },
            tracking: TrackingConfiguration {
                max_trajectory_length: env_parse(
                    "LIVEMASK_MAX_TRAJECTORY",
                    defaults.tracking.max_trajectory_length,
                ),
                reacquisition_attempts: env_parse(
                    "LIVEMASK_REACQUISITION_ATTEMPTS",
                    defaults.tracking.reacquisition_attempts,
                ),
                temporal_smoothing_factor: env_parse(
                    "LIVEMASK_SMOOTHING_FACTOR",
                    defaults.tracking.temporal_smoothing_factor,
                ),
                motion_prediction_enabled: env_parse(
                    "LIVEMASK_MOTION_PREDICTION",
                    defaults.tracking.motion_prediction_enabled,
                ),
                occlusion_handling_enabled: env_parse(
                    "LIVEMASK_OCCLUSION_HANDLING",
                    defaults.tracking.occlusion_handling_enabled,
                ),
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        let config = EngineConfig::default();
        assert_eq!(config.processing.target_fps, 30);
        assert_eq!(config.tracking.max_trajectory_length, 30);
    }
}
