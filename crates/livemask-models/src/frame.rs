//! Frame records produced by the pipeline.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mask::Mask;
use crate::resource::ResourceSnapshot;

/// Opaque image-buffer handle.
///
/// The pixel payload is reference-counted so frames can be shared between
/// the orchestrator, tracker histories, and event subscribers without
/// copying. Only the dimensions are serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameBuffer {
    /// Buffer width in pixels
    pub width: u32,
    /// Buffer height in pixels
    pub height: u32,
    /// Raw pixel payload (opaque to the pipeline)
    #[serde(skip)]
    pub data: Arc<Vec<u8>>,
}

impl FrameBuffer {
    /// Create a buffer from raw pixel data.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::new(data),
        }
    }

    /// Create an empty buffer with the given dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: Arc::new(Vec::new()),
        }
    }

    /// A buffer with a zero dimension cannot be processed.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Processing metadata captured alongside a frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMetadata {
    /// Wall-clock time spent in the pipeline for this frame
    pub processing_time: Duration,
    /// Time spent inside the inference engine
    pub inference_time: Duration,
    /// Device resource state at capture
    pub resources: ResourceSnapshot,
}

/// One processed video frame.
///
/// Created by the orchestrator after a successful inference call and
/// immutable from then on. The masks produced for this frame travel with it
/// so downstream tracking and rendering are self-contained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Image buffer the masks were computed from
    pub buffer: FrameBuffer,
    /// Capture timestamp
    pub timestamp: DateTime<Utc>,
    /// Monotonically increasing sequence number
    pub sequence: u64,
    /// Segmentation masks produced for this frame
    pub masks: Vec<Mask>,
    /// Processing metadata
    pub metadata: FrameMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_buffer() {
        assert!(FrameBuffer::with_dimensions(0, 720).is_degenerate());
        assert!(FrameBuffer::with_dimensions(1280, 0).is_degenerate());
        assert!(!FrameBuffer::with_dimensions(1280, 720).is_degenerate());
    }

    #[test]
    fn test_buffer_payload_is_shared() {
        let buffer = FrameBuffer::new(2, 2, vec![0u8; 16]);
        let clone = buffer.clone();
        assert!(Arc::ptr_eq(&buffer.data, &clone.data));
    }
}
