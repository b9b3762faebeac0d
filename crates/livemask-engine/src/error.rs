//! Error types for pipeline operations.

use livemask_models::ErrorCategory;
use livemask_tracker::TrackerError;
use thiserror::Error;

use crate::orchestrator::EngineState;

/// Result type for pipeline operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in the frame-processing pipeline.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid state: operation requires a running session, state is {0:?}")]
    InvalidState(EngineState),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("prompt limit exceeded: {count} prompts, limit {limit}")]
    PromptLimitExceeded { count: usize, limit: usize },

    #[error("frame rate exceeded, frame skipped")]
    FrameRateExceeded,

    #[error("thermal throttling: device is too hot to process")]
    ThermalThrottling,

    #[error("memory pressure shedding triggered")]
    MemoryPressure,

    #[error(transparent)]
    Tracking(#[from] TrackerError),

    #[error("inference failed: {0}")]
    Inference(String),
}

impl EngineError {
    /// Create an invalid-frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame(message.into())
    }

    /// Create an inference-failure error.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    /// Category surfaced on the event channel.
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::InvalidState(_) => ErrorCategory::InvalidState,
            EngineError::InvalidFrame(_) => ErrorCategory::InvalidFrame,
            EngineError::PromptLimitExceeded { .. } => ErrorCategory::PromptLimitExceeded,
            EngineError::FrameRateExceeded => ErrorCategory::FrameRateExceeded,
            EngineError::ThermalThrottling => ErrorCategory::ThermalThrottling,
            EngineError::MemoryPressure => ErrorCategory::MemoryPressure,
            EngineError::Tracking(_) => ErrorCategory::TrackingFailed,
            EngineError::Inference(_) => ErrorCategory::InferenceFailure,
        }
    }

    /// Whether this error halts the session. Everything else is either a
    /// synchronous rejection or a counted, recoverable failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::ThermalThrottling)
    }

    /// Soft errors describe frames that were skipped on purpose.
    pub fn is_soft(&self) -> bool {
        matches!(self, EngineError::FrameRateExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            EngineError::FrameRateExceeded.category(),
            ErrorCategory::FrameRateExceeded
        );
        assert_eq!(
            EngineError::inference("boom").category(),
            ErrorCategory::InferenceFailure
        );
        let tracking: EngineError = TrackerError::capacity_exceeded(3, 2).into();
        assert_eq!(tracking.category(), ErrorCategory::TrackingFailed);
    }

    #[test]
    fn test_fatality() {
        assert!(EngineError::ThermalThrottling.is_fatal());
        assert!(!EngineError::FrameRateExceeded.is_fatal());
        assert!(EngineError::FrameRateExceeded.is_soft());
    }
}
