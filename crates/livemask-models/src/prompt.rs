//! User prompts marking objects of interest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{BoundingBox, Point};

/// Prompt identifier.
pub type PromptId = Uuid;

/// The shape of a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptKind {
    /// Single point tap; `foreground` is false for background exclusion taps.
    Point { foreground: bool },
    /// Drag-out box around the object.
    Box,
    /// Refinement of a previously produced mask.
    MaskRefinement { target: Uuid },
}

/// A user-supplied hint indicating an object of interest.
///
/// Prompts are validated and owned elsewhere; the pipeline only reads a
/// snapshot per accepted frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    /// Prompt identifier
    pub id: PromptId,
    /// When the prompt was created
    pub created_at: DateTime<Utc>,
    /// Prompt shape
    pub kind: PromptKind,
    /// Raw location in view coordinates
    pub view_point: Point,
    /// Location mapped into the model's normalized [0, 1] space
    pub model_point: Point,
    /// Box extent for box prompts, in view coordinates
    pub view_box: Option<BoundingBox>,
}

impl Prompt {
    /// Create a foreground point prompt.
    pub fn point(view_point: Point, model_point: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            kind: PromptKind::Point { foreground: true },
            view_point,
            model_point,
            view_box: None,
        }
    }

    /// Create a background-exclusion point prompt.
    pub fn background_point(view_point: Point, model_point: Point) -> Self {
        Self {
            kind: PromptKind::Point { foreground: false },
            ..Self::point(view_point, model_point)
        }
    }

    /// Create a box prompt centered on the box's centroid.
    pub fn boxed(view_box: BoundingBox, model_point: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            kind: PromptKind::Box,
            view_point: view_box.centroid(),
            model_point,
            view_box: Some(view_box),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_prompt_centroid() {
        let bbox = BoundingBox::new(0.0, 0.0, 100.0, 50.0);
        let prompt = Prompt::boxed(bbox, Point::new(0.5, 0.25));
        assert_eq!(prompt.view_point, Point::new(50.0, 25.0));
        assert_eq!(prompt.kind, PromptKind::Box);
    }

    #[test]
    fn test_prompt_serde_roundtrip() {
        let prompt = Prompt::point(Point::new(10.0, 20.0), Point::new(0.1, 0.2));
        let json = serde_json::to_string(&prompt).unwrap();
        let parsed: Prompt = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, prompt.id);
        assert_eq!(parsed.kind, PromptKind::Point { foreground: true });
    }
}
