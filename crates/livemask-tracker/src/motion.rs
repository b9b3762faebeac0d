//! Constant-velocity motion prediction.
//!
//! Keeps a bounded trajectory per object and extrapolates the next position
//! from the last two points.

use std::collections::{HashMap, VecDeque};

use livemask_models::{ObjectId, Point};

/// Per-object trajectory store with constant-velocity extrapolation.
#[derive(Debug)]
pub struct MotionPredictor {
    trajectories: HashMap<ObjectId, VecDeque<Point>>,
    capacity: usize,
}

impl MotionPredictor {
    /// Create a predictor keeping up to `capacity` points per object.
    pub fn new(capacity: usize) -> Self {
        Self {
            trajectories: HashMap::new(),
            capacity: capacity.max(2),
        }
    }

    /// Record the latest observed position for an object.
    pub fn record(&mut self, id: ObjectId, point: Point) {
        let trajectory = self.trajectories.entry(id).or_default();
        trajectory.push_back(point);
        while trajectory.len() > self.capacity {
            trajectory.pop_front();
        }
    }

    /// Predict the next position for an object.
    ///
    /// With two or more recorded points this is `last + (last - second_to_last)`;
    /// with one point it is that point; with none it is the origin.
    pub fn predict(&self, id: &ObjectId) -> Point {
        let Some(trajectory) = self.trajectories.get(id) else {
            return Point::ZERO;
        };
        match trajectory.len() {
            0 => Point::ZERO,
            1 => trajectory[0],
            n => {
                let last = trajectory[n - 1];
                let prev = trajectory[n - 2];
                Point::new(last.x + (last.x - prev.x), last.y + (last.y - prev.y))
            }
        }
    }

    /// Whether a trajectory exists for the object.
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.trajectories.contains_key(id)
    }

    /// Drop the trajectory for one object.
    pub fn remove(&mut self, id: &ObjectId) {
        self.trajectories.remove(id);
    }

    /// Drop all trajectories; used on camera switch.
    pub fn clear_all(&mut self) {
        self.trajectories.clear();
    }
}

impl Default for MotionPredictor {
    fn default() -> Self {
        Self::new(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_predict_extrapolates_velocity() {
        let mut predictor = MotionPredictor::default();
        let id = Uuid::new_v4();
        predictor.record(id, Point::new(0.0, 0.0));
        predictor.record(id, Point::new(10.0, 0.0));

        let predicted = predictor.predict(&id);
        assert_eq!(predicted, Point::new(20.0, 0.0));
    }

    #[test]
    fn test_predict_single_point_returns_it() {
        let mut predictor = MotionPredictor::default();
        let id = Uuid::new_v4();
        predictor.record(id, Point::new(7.0, 3.0));
        assert_eq!(predictor.predict(&id), Point::new(7.0, 3.0));
    }

    #[test]
    fn test_predict_unknown_returns_origin() {
        let predictor = MotionPredictor::default();
        assert_eq!(predictor.predict(&Uuid::new_v4()), Point::ZERO);
    }

    #[test]
    fn test_trajectory_bounded() {
        let mut predictor = MotionPredictor::new(3);
        let id = Uuid::new_v4();
        for i in 0..10 {
            predictor.record(id, Point::new(i as f64, 0.0));
        }
        // Only the last three points remain: 7, 8, 9 -> predict 10.
        assert_eq!(predictor.predict(&id), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_clear_all() {
        let mut predictor = MotionPredictor::default();
        let id = Uuid::new_v4();
        predictor.record(id, Point::new(1.0, 1.0));
        predictor.clear_all();
        assert!(!predictor.contains(&id));
        assert_eq!(predictor.predict(&id), Point::ZERO);
    }
}
