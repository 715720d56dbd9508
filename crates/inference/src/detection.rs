//! Detection result types and filtering

use serde::{Deserialize, Serialize};

/// COCO class id for "person"
pub const PERSON_CLASS_ID: u32 = 0;

/// Axis-aligned bounding box in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Center point of the box. Zone membership is evaluated at this point.
    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// One detected object from a single inference tick.
///
/// Ephemeral: produced fresh each tick, reused unchanged between ticks only
/// for display, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub class_id: u32,
    pub confidence: f32,
}

/// Keep person detections at or above the confidence threshold.
pub fn filter_persons(detections: Vec<Detection>, confidence_threshold: f32) -> Vec<Detection> {
    detections
        .into_iter()
        .filter(|d| d.class_id == PERSON_CLASS_ID && d.confidence >= confidence_threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(class_id: u32, confidence: f32) -> Detection {
        Detection {
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            class_id,
            confidence,
        }
    }

    #[test]
    fn test_center() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 60.0);
        assert_eq!(bbox.center(), (20.0, 40.0));
    }

    #[test]
    fn test_filter_discards_low_confidence() {
        // Confidence 0.4 below a 0.5 threshold is discarded entirely.
        let kept = filter_persons(vec![det(PERSON_CLASS_ID, 0.4)], 0.5);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_filter_keeps_threshold_boundary() {
        let kept = filter_persons(vec![det(PERSON_CLASS_ID, 0.5)], 0.5);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_filter_discards_other_classes() {
        // class 2 = car in COCO
        let kept = filter_persons(vec![det(2, 0.99), det(PERSON_CLASS_ID, 0.9)], 0.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].class_id, PERSON_CLASS_ID);
    }
}
