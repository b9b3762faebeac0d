//! Pipeline event envelope pushed to UI and diagnostics subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::mask::ObjectId;
use crate::object::TrackedObject;

/// Error categories surfaced on the event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Operation called outside its required lifecycle state
    InvalidState,
    /// Malformed input buffer
    InvalidFrame,
    /// More prompts than the object capacity allows
    PromptLimitExceeded,
    /// Frame arrived before the minimum inter-frame interval elapsed
    FrameRateExceeded,
    /// Thermal state forbids processing
    ThermalThrottling,
    /// Capacity violation at tracking initialization
    TrackingFailed,
    /// Opaque failure from the inference engine
    InferenceFailure,
    /// Memory-pressure shedding was triggered
    MemoryPressure,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidState => "invalid_state",
            ErrorCategory::InvalidFrame => "invalid_frame",
            ErrorCategory::PromptLimitExceeded => "prompt_limit_exceeded",
            ErrorCategory::FrameRateExceeded => "frame_rate_exceeded",
            ErrorCategory::ThermalThrottling => "thermal_throttling",
            ErrorCategory::TrackingFailed => "tracking_failed",
            ErrorCategory::InferenceFailure => "inference_failure",
            ErrorCategory::MemoryPressure => "memory_pressure",
        }
    }
}

/// Event envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Processing session started
    ProcessingStarted,

    /// Processing session stopped
    ProcessingStopped,

    /// A frame finished inference; carries the full frame and its masks
    FrameProcessed { frame: Frame },

    /// The tracked-object set after an update cycle
    TrackingUpdated { objects: Vec<TrackedObject> },

    /// An object dropped below confidence or failed matching
    ObjectLost { id: ObjectId },

    /// A lost object was matched again
    ObjectReacquired { id: ObjectId },

    /// An object was removed permanently
    ObjectRemoved { id: ObjectId },

    /// A categorized error occurred
    Error {
        category: ErrorCategory,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl EngineEvent {
    /// Create an error event timestamped now.
    pub fn error(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::Error {
            category,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}
