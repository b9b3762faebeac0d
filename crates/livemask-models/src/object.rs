//! Tracked-object state and history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::mask::{Mask, ObjectId};

/// A freshly segmented object used to seed tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentedObject {
    /// Initial mask observation
    pub mask: Mask,
    /// Optional class label
    pub label: Option<String>,
}

impl SegmentedObject {
    /// Create an unlabeled segmented object.
    pub fn new(mask: Mask) -> Self {
        Self { mask, label: None }
    }

    /// Create a labeled segmented object.
    pub fn labeled(mask: Mask, label: impl Into<String>) -> Self {
        Self {
            mask,
            label: Some(label.into()),
        }
    }
}

/// The persistent identity and history of one object across frames.
///
/// Mask and trajectory histories are bounded; the oldest entry is dropped
/// first once the configured length is reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedObject {
    /// Stable identifier for the object's lifetime
    pub id: ObjectId,
    /// Recent mask observations, oldest first
    pub mask_history: VecDeque<Mask>,
    /// Recent centroids, oldest first
    pub trajectory: VecDeque<Point>,
    /// Current confidence
    pub confidence: f64,
    /// Whether the object is currently matched
    pub is_active: bool,
    /// Timestamp of the most recent observation
    pub last_seen: DateTime<Utc>,
    /// When tracking of this object began
    pub created_at: DateTime<Utc>,
    /// Optional class label
    pub label: Option<String>,
}

impl TrackedObject {
    /// Seed a tracked object from its first observation.
    pub fn from_seed(seed: &SegmentedObject) -> Self {
        let mask = seed.mask.clone();
        let now = mask.timestamp;
        let mut mask_history = VecDeque::new();
        let mut trajectory = VecDeque::new();
        let confidence = mask.confidence;
        let centroid = mask.centroid;
        let id = mask.object_id;
        mask_history.push_back(mask);
        trajectory.push_back(centroid);

        Self {
            id,
            mask_history,
            trajectory,
            confidence,
            is_active: true,
            last_seen: now,
            created_at: now,
            label: seed.label.clone(),
        }
    }

    /// Most recent mask observation.
    pub fn last_mask(&self) -> Option<&Mask> {
        self.mask_history.back()
    }

    /// Most recent centroid.
    pub fn last_centroid(&self) -> Option<Point> {
        self.trajectory.back().copied()
    }

    /// Append an observation, evicting the oldest entries past `max_len`.
    pub fn push_observation(&mut self, mask: Mask, max_len: usize) {
        let centroid = mask.centroid;
        self.confidence = mask.confidence;
        self.last_seen = mask.timestamp;
        self.mask_history.push_back(mask);
        self.trajectory.push_back(centroid);
        while self.mask_history.len() > max_len {
            self.mask_history.pop_front();
        }
        while self.trajectory.len() > max_len {
            self.trajectory.pop_front();
        }
    }
}

/// Snapshot of an object that failed matching, pending re-acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LostObjectRecord {
    /// Last known object state
    pub object: TrackedObject,
    /// When the object was lost
    pub lost_at: DateTime<Utc>,
    /// Re-acquisition attempts made so far
    pub attempts: u32,
}

impl LostObjectRecord {
    /// Record a newly lost object.
    pub fn new(mut object: TrackedObject) -> Self {
        object.is_active = false;
        Self {
            object,
            lost_at: Utc::now(),
            attempts: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::mask::MaskBuffer;
    use uuid::Uuid;

    fn mask_at(x: f64, y: f64) -> Mask {
        Mask::new(
            Uuid::new_v4(),
            MaskBuffer::with_dimensions(8, 8),
            0.9,
            BoundingBox::new(x, y, 10.0, 10.0),
            Utc::now(),
        )
    }

    #[test]
    fn test_seed_has_single_entry_histories() {
        let object = TrackedObject::from_seed(&SegmentedObject::new(mask_at(0.0, 0.0)));
        assert_eq!(object.mask_history.len(), 1);
        assert_eq!(object.trajectory.len(), 1);
        assert!(object.is_active);
    }

    #[test]
    fn test_history_truncation_is_fifo() {
        let mut object = TrackedObject::from_seed(&SegmentedObject::new(mask_at(0.0, 0.0)));
        for i in 1..10 {
            let mut mask = mask_at(i as f64 * 10.0, 0.0);
            mask.object_id = object.id;
            object.push_observation(mask, 3);
        }
        assert_eq!(object.mask_history.len(), 3);
        assert_eq!(object.trajectory.len(), 3);
        // Oldest entries dropped first: front is the third-to-last push.
        assert_eq!(object.trajectory.front().unwrap().x, 75.0);
        assert_eq!(object.trajectory.back().unwrap().x, 95.0);
    }

    #[test]
    fn test_lost_record_starts_at_zero_attempts() {
        let object = TrackedObject::from_seed(&SegmentedObject::new(mask_at(0.0, 0.0)));
        let record = LostObjectRecord::new(object);
        assert_eq!(record.attempts, 0);
        assert!(!record.object.is_active);
    }
}
