//! Error types for tracking operations.

use livemask_models::ObjectId;
use thiserror::Error;

/// Result type for tracking operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors that can occur during object tracking.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracking failed: {count} objects exceed capacity of {limit}")]
    TrackingFailed { count: usize, limit: usize },

    #[error("unknown object: {0}")]
    UnknownObject(ObjectId),
}

impl TrackerError {
    /// Create a capacity-violation error.
    pub fn capacity_exceeded(count: usize, limit: usize) -> Self {
        Self::TrackingFailed { count, limit }
    }
}
