//! Match scoring between a tracked object and a mask observation.
//!
//! The score is a fixed weighted sum of spatial proximity, size similarity,
//! observation confidence, and bounding-box IoU. Matching is greedy per
//! object rather than a global optimal assignment; with small object counts
//! this is adequate, though overlapping objects can claim the same
//! observation in crowded scenes.

use livemask_models::{Mask, Point, TrackedObject};

/// Weight of spatial proximity in the match score.
pub const SPATIAL_WEIGHT: f64 = 0.4;
/// Weight of size-ratio similarity.
pub const SIZE_WEIGHT: f64 = 0.2;
/// Weight of raw observation confidence.
pub const CONFIDENCE_WEIGHT: f64 = 0.2;
/// Weight of bounding-box IoU.
pub const IOU_WEIGHT: f64 = 0.2;

/// Assumed maximum inter-frame displacement used to normalize distance.
pub const MAX_DISPLACEMENT: f64 = 200.0;

/// Score a mask observation as a continuation of a tracked object.
///
/// `predicted` is the motion-predicted centroid when prediction is enabled;
/// proximity is measured to whichever of the last and predicted centroids is
/// closer.
pub fn match_score(object: &TrackedObject, predicted: Option<Point>, mask: &Mask) -> f64 {
    let Some(last) = object.last_mask() else {
        return 0.0;
    };

    let mut distance = last.centroid.distance(&mask.centroid);
    if let Some(predicted) = predicted {
        distance = distance.min(predicted.distance(&mask.centroid));
    }
    let spatial = (1.0 - distance / MAX_DISPLACEMENT).clamp(0.0, 1.0);

    let size = size_similarity(last.area, mask.area);
    let iou = last.bounding_box.iou(&mask.bounding_box);

    SPATIAL_WEIGHT * spatial
        + SIZE_WEIGHT * size
        + CONFIDENCE_WEIGHT * mask.confidence
        + IOU_WEIGHT * iou
}

/// Size-ratio similarity `min(a, b) / max(a, b)` in [0, 1].
fn size_similarity(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max <= 0.0 {
        return 0.0;
    }
    a.min(b) / max
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use livemask_models::{BoundingBox, MaskBuffer, SegmentedObject};
    use uuid::Uuid;

    fn mask_at(x: f64, y: f64, size: f64, confidence: f64) -> Mask {
        Mask::new(
            Uuid::new_v4(),
            MaskBuffer::with_dimensions(8, 8),
            confidence,
            BoundingBox::new(x, y, size, size),
            Utc::now(),
        )
    }

    fn object_at(x: f64, y: f64, size: f64) -> TrackedObject {
        TrackedObject::from_seed(&SegmentedObject::new(mask_at(x, y, size, 0.9)))
    }

    #[test]
    fn test_identical_observation_scores_near_one() {
        let object = object_at(100.0, 100.0, 50.0);
        let mask = mask_at(100.0, 100.0, 50.0, 1.0);
        let score = match_score(&object, None, &mask);
        assert!(score > 0.99, "score = {score}");
    }

    #[test]
    fn test_distant_observation_loses_spatial_weight() {
        let object = object_at(0.0, 0.0, 50.0);
        // Same size and shape but displaced past the normalization bound.
        let far = mask_at(400.0, 0.0, 50.0, 1.0);
        let near = mask_at(10.0, 0.0, 50.0, 1.0);
        assert!(match_score(&object, None, &near) > match_score(&object, None, &far));
        // Spatial term fully saturated away: only size + confidence remain.
        let score = match_score(&object, None, &far);
        assert!(score <= SIZE_WEIGHT + CONFIDENCE_WEIGHT + 1e-9);
    }

    #[test]
    fn test_prediction_recovers_moving_object() {
        let object = object_at(0.0, 0.0, 50.0);
        let mask = mask_at(190.0, 0.0, 50.0, 0.9);

        let unaided = match_score(&object, None, &mask);
        // Prediction puts the expected centroid right on the observation.
        let aided = match_score(&object, Some(Point::new(215.0, 25.0)), &mask);
        assert!(aided > unaided);
    }

    #[test]
    fn test_size_similarity_bounds() {
        assert_eq!(size_similarity(0.0, 0.0), 0.0);
        assert_eq!(size_similarity(100.0, 100.0), 1.0);
        assert!((size_similarity(50.0, 100.0) - 0.5).abs() < 1e-9);
    }
}
