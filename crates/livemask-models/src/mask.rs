//! Segmentation mask observations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{BoundingBox, Point};

/// Stable identifier for a segmented object.
pub type ObjectId = Uuid;

/// Opaque mask-buffer handle (grayscale, one byte per pixel).
///
/// Like [`crate::FrameBuffer`], the payload is reference-counted and never
/// interpolated or mutated by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskBuffer {
    /// Mask width in pixels
    pub width: u32,
    /// Mask height in pixels
    pub height: u32,
    /// Raw mask payload (opaque to the pipeline)
    #[serde(skip)]
    pub data: Arc<Vec<u8>>,
}

impl MaskBuffer {
    /// Create a mask buffer from raw data.
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
}

/// Per-object segmentation result for one frame.
///
/// Produced by the inference engine and consumed read-only by the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mask {
    /// Object this mask belongs to
    pub object_id: ObjectId,
    /// Mask pixels
    pub buffer: MaskBuffer,
    /// Observation confidence, clamped to [0, 1]
    pub confidence: f64,
    /// Tight bounding box around the mask
    pub bounding_box: BoundingBox,
    /// Mask area
    pub area: f64,
    /// Mask centroid
    pub centroid: Point,
    /// Observation timestamp
    pub timestamp: DateTime<Utc>,
}

impl Mask {
    /// Create a new mask observation. Confidence is clamped to [0, 1].
    pub fn new(
        object_id: ObjectId,
        buffer: MaskBuffer,
        confidence: f64,
        bounding_box: BoundingBox,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            object_id,
            buffer,
            confidence: confidence.clamp(0.0, 1.0),
            area: bounding_box.area(),
            centroid: bounding_box.centroid(),
            bounding_box,
            timestamp,
        }
    }

    /// Copy of this mask with blended geometry and the original buffer.
    pub fn with_geometry(&self, bounding_box: BoundingBox, centroid: Point, area: f64) -> Self {
        Self {
            object_id: self.object_id,
            buffer: self.buffer.clone(),
            confidence: self.confidence,
            bounding_box,
            area,
            centroid,
            timestamp: self.timestamp,
        }
    }
}
