//! Multi-object tracker with loss and re-acquisition handling.
//!
//! Matches tracked objects to mask observations frame by frame, smooths
//! matched geometry, parks unmatched objects in a lost map, and re-acquires
//! them from unclaimed observations while attempts remain.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use livemask_models::{
    Frame, LostObjectRecord, Mask, ObjectId, Point, SegmentedObject, TrackedObject,
    TrackingConfiguration,
};

use crate::error::{TrackerError, TrackerResult};
use crate::matching::match_score;
use crate::motion::MotionPredictor;

/// Score a lost object must reach against an unclaimed observation to be
/// re-activated.
const REACQUISITION_SCORE_FLOOR: f64 = 0.5;

/// Fraction of the confidence threshold applied to re-acquisition candidates.
const REACQUISITION_CONFIDENCE_RELAXATION: f64 = 0.8;

/// Outcome of one tracking update cycle.
#[derive(Debug, Clone, Default)]
pub struct TrackingUpdate {
    /// Snapshot of the active set after the update
    pub objects: Vec<TrackedObject>,
    /// Objects that became lost this cycle
    pub lost: Vec<ObjectId>,
    /// Objects re-acquired from the lost map this cycle
    pub reacquired: Vec<ObjectId>,
    /// Objects removed permanently this cycle
    pub removed: Vec<ObjectId>,
}

/// Outcome of an on-demand re-acquisition attempt.
#[derive(Debug, Clone)]
pub enum ReacquisitionOutcome {
    /// The object was matched and moved back to the active set
    Reacquired(TrackedObject),
    /// No qualifying candidate; attempts used so far
    Pending(u32),
    /// Attempts exhausted; the record was discarded permanently
    Expired,
}

/// Owns the active and lost object sets and the motion predictor.
///
/// All mutating operations are synchronous; callers serialize access.
#[derive(Debug)]
pub struct ObjectTracker {
    config: TrackingConfiguration,
    /// Active-object capacity, from the processing configuration
    capacity: usize,
    /// Confidence floor for keeping an object matched
    confidence_threshold: f64,
    active: Vec<TrackedObject>,
    lost: HashMap<ObjectId, LostObjectRecord>,
    predictor: MotionPredictor,
}

impl ObjectTracker {
    /// Create a tracker with the given configuration and capacity limits.
    pub fn new(config: TrackingConfiguration, capacity: usize, confidence_threshold: f64) -> Self {
        let config = config.sanitized();
        let predictor = MotionPredictor::new(config.max_trajectory_length);
        Self {
            config,
            capacity,
            confidence_threshold,
            active: Vec::new(),
            lost: HashMap::new(),
            predictor,
        }
    }

    /// Replace the tracking configuration; applies from the next update.
    pub fn set_config(&mut self, config: TrackingConfiguration) {
        self.config = config.sanitized();
    }

    /// Update capacity and confidence floor from the processing
    /// configuration; applies from the next update.
    pub fn set_processing_limits(&mut self, capacity: usize, confidence_threshold: f64) {
        self.capacity = capacity.max(1);
        self.confidence_threshold = confidence_threshold;
    }

    /// Snapshot of the active set.
    pub fn objects(&self) -> Vec<TrackedObject> {
        self.active.clone()
    }

    /// Number of active objects.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of objects awaiting re-acquisition.
    pub fn lost_count(&self) -> usize {
        self.lost.len()
    }

    /// Replace all tracker state with one object per seed.
    ///
    /// Fails with a capacity error when more seeds than `capacity` are
    /// given; existing state is untouched on failure.
    pub fn initialize_tracking(
        &mut self,
        seeds: &[SegmentedObject],
    ) -> TrackerResult<Vec<TrackedObject>> {
        if seeds.len() > self.capacity {
            return Err(TrackerError::capacity_exceeded(seeds.len(), self.capacity));
        }

        self.active.clear();
        self.lost.clear();
        self.predictor.clear_all();

        for seed in seeds {
            let object = TrackedObject::from_seed(seed);
            if self.config.motion_prediction_enabled {
                if let Some(centroid) = object.last_centroid() {
                    self.predictor.record(object.id, centroid);
                }
            }
            self.active.push(object);
        }

        info!(objects = self.active.len(), "tracking initialized");
        Ok(self.objects())
    }

    /// Match active objects against the frame's masks and maintain the lost
    /// map. Returns the resulting active set plus per-object transitions.
    pub fn update(&mut self, frame: &Frame) -> TrackingUpdate {
        let masks = &frame.masks;
        let mut outcome = TrackingUpdate::default();
        let mut claimed: HashSet<usize> = HashSet::new();
        let mut still_active = Vec::with_capacity(self.active.len());

        // Greedy per-object matching: each object independently takes its
        // best-scoring observation. Observations are not reserved between
        // active objects, so overlapping objects can select the same one.
        for mut object in std::mem::take(&mut self.active) {
            let predicted = self.predicted_centroid(&object.id);
            let best = masks
                .iter()
                .enumerate()
                .map(|(idx, mask)| (idx, match_score(&object, predicted, mask)))
                .max_by(|a, b| a.1.total_cmp(&b.1));

            match best {
                Some((idx, score)) if masks[idx].confidence >= self.confidence_threshold => {
                    claimed.insert(idx);
                    let observation = self.smoothed_observation(&object, &masks[idx]);
                    self.apply_observation(&mut object, observation);
                    debug!(id = %object.id, score, "object matched");
                    still_active.push(object);
                }
                _ => {
                    let id = object.id;
                    debug!(id = %id, "object lost");
                    self.lost.insert(id, LostObjectRecord::new(object));
                    outcome.lost.push(id);
                }
            }
        }
        // A capacity reduction mid-session sheds the lowest-confidence
        // objects so the active count stays within bounds.
        if still_active.len() > self.capacity {
            still_active.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
            for object in still_active.split_off(self.capacity) {
                let id = object.id;
                debug!(id = %id, "object shed over capacity");
                self.lost.insert(id, LostObjectRecord::new(object));
                outcome.lost.push(id);
            }
        }
        self.active = still_active;

        if self.config.occlusion_handling_enabled {
            self.reacquire_lost(masks, &mut claimed, &mut outcome);
        }

        outcome.objects = self.objects();
        outcome
    }

    /// On-demand re-acquisition for a single lost object, outside the
    /// regular per-frame cycle.
    pub fn attempt_reacquisition(
        &mut self,
        id: &ObjectId,
        frame: &Frame,
    ) -> TrackerResult<ReacquisitionOutcome> {
        if !self.lost.contains_key(id) {
            return Err(TrackerError::UnknownObject(*id));
        }

        let mut claimed = HashSet::new();
        match self.try_reacquire(id, &frame.masks, &mut claimed) {
            Some(object) => Ok(ReacquisitionOutcome::Reacquired(object)),
            None => {
                let Some(record) = self.lost.get_mut(id) else {
                    // try_reacquire discards exhausted records.
                    return Ok(ReacquisitionOutcome::Expired);
                };
                Ok(ReacquisitionOutcome::Pending(record.attempts))
            }
        }
    }

    /// Remove one object from the active set or the lost map.
    pub fn remove_object(&mut self, id: &ObjectId) -> bool {
        let before = self.active.len();
        self.active.retain(|object| object.id != *id);
        let removed = self.active.len() < before || self.lost.remove(id).is_some();
        if removed {
            self.predictor.remove(id);
            info!(id = %id, "object removed");
        }
        removed
    }

    /// Remove all objects; returns one id per removed object.
    pub fn clear_all(&mut self) -> Vec<ObjectId> {
        let mut removed: Vec<ObjectId> = self.active.drain(..).map(|object| object.id).collect();
        removed.extend(self.lost.drain().map(|(id, _)| id));
        for id in &removed {
            self.predictor.remove(id);
        }
        if !removed.is_empty() {
            info!(count = removed.len(), "all objects cleared");
        }
        removed
    }

    /// Clear all objects and reset the motion predictor's trajectory store.
    /// A viewpoint change invalidates every position assumption.
    pub fn handle_camera_switch(&mut self) -> Vec<ObjectId> {
        let removed = self.clear_all();
        self.predictor.clear_all();
        removed
    }

    fn predicted_centroid(&self, id: &ObjectId) -> Option<Point> {
        if self.config.motion_prediction_enabled && self.predictor.contains(id) {
            Some(self.predictor.predict(id))
        } else {
            None
        }
    }

    /// Blend the observation's geometry toward the previous one when
    /// smoothing is enabled. The mask buffer itself is never interpolated.
    fn smoothed_observation(&self, object: &TrackedObject, mask: &Mask) -> Mask {
        let factor = self.config.temporal_smoothing_factor;
        let mut observation = match object.last_mask() {
            Some(prev) if factor > 0.0 => {
                let centroid = prev.centroid.blend(&mask.centroid, factor);
                let bounding_box = prev.bounding_box.blend(&mask.bounding_box, factor);
                let area = factor * prev.area + (1.0 - factor) * mask.area;
                mask.with_geometry(bounding_box, centroid, area)
            }
            _ => mask.clone(),
        };
        observation.object_id = object.id;
        observation
    }

    fn apply_observation(&mut self, object: &mut TrackedObject, observation: Mask) {
        let centroid = observation.centroid;
        object.is_active = true;
        object.push_observation(observation, self.config.max_trajectory_length);
        if self.config.motion_prediction_enabled {
            self.predictor.record(object.id, centroid);
        }
    }

    /// Re-evaluate every lost record against unclaimed observations.
    fn reacquire_lost(
        &mut self,
        masks: &[Mask],
        claimed: &mut HashSet<usize>,
        outcome: &mut TrackingUpdate,
    ) {
        let ids: Vec<ObjectId> = self.lost.keys().copied().collect();
        for id in ids {
            match self.try_reacquire(&id, masks, claimed) {
                Some(_) => outcome.reacquired.push(id),
                None => {
                    if !self.lost.contains_key(&id) {
                        outcome.removed.push(id);
                    }
                }
            }
        }
    }

    /// Try to move one lost object back to the active set. On failure the
    /// attempt counter advances and exhausted records are discarded.
    fn try_reacquire(
        &mut self,
        id: &ObjectId,
        masks: &[Mask],
        claimed: &mut HashSet<usize>,
    ) -> Option<TrackedObject> {
        let record = self.lost.get(id)?;
        let relaxed_floor = REACQUISITION_CONFIDENCE_RELAXATION * self.confidence_threshold;
        let predicted = self.predicted_centroid(id);

        let best = masks
            .iter()
            .enumerate()
            .filter(|(idx, mask)| !claimed.contains(idx) && mask.confidence >= relaxed_floor)
            .map(|(idx, mask)| (idx, match_score(&record.object, predicted, mask)))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((idx, score)) = best {
            if score > REACQUISITION_SCORE_FLOOR && self.active.len() < self.capacity {
                claimed.insert(idx);
                let mut record = self.lost.remove(id).expect("record present");
                let observation = self.smoothed_observation(&record.object, &masks[idx]);
                self.apply_observation(&mut record.object, observation);
                info!(id = %id, score, "object reacquired");
                self.active.push(record.object.clone());
                return Some(record.object);
            }
        }

        let record = self.lost.get_mut(id).expect("record present");
        record.attempts += 1;
        if record.attempts > self.config.reacquisition_attempts {
            self.lost.remove(id);
            self.predictor.remove(id);
            info!(id = %id, "reacquisition attempts exhausted, object gone");
        }
        None
    }
}
