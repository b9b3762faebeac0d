//! Pipeline events via a broadcast channel.

use tokio::sync::broadcast;
use tracing::debug;

use livemask_models::{EngineEvent, ErrorCategory, Frame, ObjectId, TrackedObject};

/// Default capacity of the event buffer per subscriber.
const DEFAULT_CAPACITY: usize = 256;

/// Channel for publishing pipeline events to UI and diagnostics consumers.
///
/// Broadcast semantics: every subscriber sees every event; a subscriber
/// that falls behind loses the oldest buffered events. Publishing with no
/// subscribers is not an error.
#[derive(Debug, Clone)]
pub struct EventChannel {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventChannel {
    /// Create a channel with the default buffer capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a channel with a custom buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Publish an event.
    pub fn publish(&self, event: EngineEvent) {
        debug!(?event, "publishing engine event");
        let _ = self.sender.send(event);
    }

    /// Publish a processing-started event.
    pub fn started(&self) {
        self.publish(EngineEvent::ProcessingStarted);
    }

    /// Publish a processing-stopped event.
    pub fn stopped(&self) {
        self.publish(EngineEvent::ProcessingStopped);
    }

    /// Publish a frame-processed event carrying the full frame.
    pub fn frame_processed(&self, frame: &Frame) {
        self.publish(EngineEvent::FrameProcessed {
            frame: frame.clone(),
        });
    }

    /// Publish the tracked-object set after an update cycle.
    pub fn tracking_updated(&self, objects: Vec<TrackedObject>) {
        self.publish(EngineEvent::TrackingUpdated { objects });
    }

    /// Publish an object-lost notification.
    pub fn object_lost(&self, id: ObjectId) {
        self.publish(EngineEvent::ObjectLost { id });
    }

    /// Publish an object-reacquired notification.
    pub fn object_reacquired(&self, id: ObjectId) {
        self.publish(EngineEvent::ObjectReacquired { id });
    }

    /// Publish an object-removed notification.
    pub fn object_removed(&self, id: ObjectId) {
        self.publish(EngineEvent::ObjectRemoved { id });
    }

    /// Publish a categorized error.
    pub fn error(&self, category: ErrorCategory, message: impl Into<String>) {
        self.publish(EngineEvent::error(category, message));
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let channel = EventChannel::new();
        let mut rx = channel.subscribe();

        channel.started();
        channel.error(ErrorCategory::InferenceFailure, "engine offline");

        assert!(matches!(
            rx.recv().await.unwrap(),
            EngineEvent::ProcessingStarted
        ));
        assert!(matches!(rx.recv().await.unwrap(), EngineEvent::Error { .. }));
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let channel = EventChannel::new();
        channel.stopped();
    }
}
