//! Geometry primitives shared across the pipeline.

use serde::{Deserialize, Serialize};

/// A 2D point in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Origin point.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear blend `factor * self + (1 - factor) * other`.
    pub fn blend(&self, other: &Point, factor: f64) -> Point {
        Point {
            x: factor * self.x + (1.0 - factor) * other.x,
            y: factor * self.y + (1.0 - factor) * other.y,
        }
    }
}

/// Bounding box in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge x-coordinate
    pub x: f64,
    /// Top edge y-coordinate
    pub y: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Center x-coordinate.
    #[inline]
    pub fn cx(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Center y-coordinate.
    #[inline]
    pub fn cy(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Right edge x-coordinate.
    #[inline]
    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate.
    #[inline]
    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    /// Box area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Box center as a point.
    #[inline]
    pub fn centroid(&self) -> Point {
        Point::new(self.cx(), self.cy())
    }

    /// Compute Intersection over Union with another box.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.x2().min(other.x2());
        let y2 = self.y2().min(other.y2());

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = (x2 - x1) * (y2 - y1);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Linear blend `factor * self + (1 - factor) * other`, edge by edge.
    pub fn blend(&self, other: &BoundingBox, factor: f64) -> BoundingBox {
        let inv = 1.0 - factor;
        BoundingBox {
            x: factor * self.x + inv * other.x,
            y: factor * self.y + inv * other.y,
            width: factor * self.width + inv * other.width,
            height: factor * self.height + inv * other.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_blend() {
        let prev = Point::new(100.0, 100.0);
        let new = Point::new(200.0, 200.0);
        let blended = prev.blend(&new, 0.8);
        assert!((blended.x - 120.0).abs() < 1e-9);
        assert!((blended.y - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box_iou() {
        let box1 = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let box2 = BoundingBox::new(50.0, 50.0, 100.0, 100.0);

        let iou = box1.iou(&box2);
        // Intersection: 50x50 = 2500
        // Union: 10000 + 10000 - 2500 = 17500
        assert!((iou - 0.1428).abs() < 0.01);
    }

    #[test]
    fn test_bounding_box_no_overlap() {
        let box1 = BoundingBox::new(0.0, 0.0, 50.0, 50.0);
        let box2 = BoundingBox::new(100.0, 100.0, 50.0, 50.0);

        assert_eq!(box1.iou(&box2), 0.0);
    }

    #[test]
    fn test_bounding_box_blend() {
        let prev = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let new = BoundingBox::new(100.0, 100.0, 200.0, 200.0);

        let blended = prev.blend(&new, 0.5);
        assert_eq!(blended.x, 50.0);
        assert_eq!(blended.width, 150.0);
    }

    #[test]
    fn test_centroid() {
        let bbox = BoundingBox::new(10.0, 20.0, 100.0, 60.0);
        let c = bbox.centroid();
        assert_eq!(c.x, 60.0);
        assert_eq!(c.y, 50.0);
    }
}
