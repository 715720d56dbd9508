//! Rule-based coarse expression classification
//!
//! Classifies from two geometric metrics: the vertical eyebrow-to-eye
//! distance (brow raise/furrow) and the mouth-corner curl relative to the
//! upper lip (smile/frown), plus the raw lip opening. Cutoffs are fixed
//! empirical values in normalized landmark space, not learned.

use crate::landmarks::{
    mean_y, LEFT_EYE, LEFT_EYEBROW, MOUTH_BOTTOM, MOUTH_CORNER_LEFT, MOUTH_CORNER_RIGHT,
    MOUTH_TOP, RIGHT_EYE, RIGHT_EYEBROW,
};
use serde::{Deserialize, Serialize};

/// Coarse expression labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionLabel {
    Neutral,
    Happy,
    Sad,
    Surprised,
    Pain,
    Angry,
}

/// Expression classification with a bounded confidence score
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Expression {
    pub label: ExpressionLabel,
    /// How far the winning metric exceeded its cutoff, clamped to <= 0.9
    pub confidence: f32,
}

// Cutoffs in normalized landmark space
const BROW_RAISED_DIST: f32 = 0.04;
const BROW_LOWERED_DIST: f32 = 0.025;
const MOUTH_OPEN_SURPRISED: f32 = 0.03;
const MOUTH_OPEN_PAIN: f32 = 0.02;
const MOUTH_CLOSED_ANGRY: f32 = 0.015;
const CORNER_CURL: f32 = 0.015;
const MAX_CONFIDENCE: f32 = 0.9;

/// Classify an expression from the landmark set.
///
/// Branch precedence: surprised > happy > sad > pain > angry > neutral.
pub fn classify(points: &[(f32, f32)]) -> Expression {
    let eyebrow_avg =
        (mean_y(points, &LEFT_EYEBROW) + mean_y(points, &RIGHT_EYEBROW)) / 2.0;
    let eye_avg = (mean_y(points, &LEFT_EYE) + mean_y(points, &RIGHT_EYE)) / 2.0;
    // Larger means brows raised (y grows downward in image space)
    let eyebrow_eye_dist = eye_avg - eyebrow_avg;

    let mouth_top = points[MOUTH_TOP].1;
    let mouth_bottom = points[MOUTH_BOTTOM].1;
    let mouth_opening = mouth_bottom - mouth_top;

    let corners_avg = (points[MOUTH_CORNER_LEFT].1 + points[MOUTH_CORNER_RIGHT].1) / 2.0;
    // Positive when the corners sit above the upper lip (smile)
    let mouth_corner_curl = mouth_top - corners_avg;

    let (label, confidence) = if eyebrow_eye_dist > BROW_RAISED_DIST
        && mouth_opening > MOUTH_OPEN_SURPRISED
    {
        (
            ExpressionLabel::Surprised,
            eyebrow_eye_dist * 15.0 + mouth_opening * 15.0,
        )
    } else if mouth_corner_curl > CORNER_CURL {
        (ExpressionLabel::Happy, mouth_corner_curl * 40.0)
    } else if mouth_corner_curl < -CORNER_CURL {
        (ExpressionLabel::Sad, mouth_corner_curl.abs() * 40.0)
    } else if eyebrow_eye_dist < BROW_LOWERED_DIST && mouth_opening > MOUTH_OPEN_PAIN {
        (ExpressionLabel::Pain, (0.03 - eyebrow_eye_dist) * 20.0)
    } else if eyebrow_eye_dist < BROW_LOWERED_DIST && mouth_opening < MOUTH_CLOSED_ANGRY {
        (ExpressionLabel::Angry, (0.03 - eyebrow_eye_dist) * 20.0)
    } else {
        (ExpressionLabel::Neutral, 0.5)
    };

    Expression {
        label,
        confidence: confidence.min(MAX_CONFIDENCE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::test_support::mesh_with;

    fn classify_params(dist: f32, opening: f32, curl: f32) -> Expression {
        classify(&mesh_with(0.3, 0.1, dist, opening, curl))
    }

    #[test]
    fn test_neutral_default() {
        let e = classify_params(0.03, 0.005, 0.0);
        assert_eq!(e.label, ExpressionLabel::Neutral);
        assert_eq!(e.confidence, 0.5);
    }

    #[test]
    fn test_surprised_brows_raised_mouth_open() {
        let e = classify_params(0.05, 0.04, 0.0);
        assert_eq!(e.label, ExpressionLabel::Surprised);
        assert!(e.confidence > 0.0 && e.confidence <= 0.9);
    }

    #[test]
    fn test_happy_corners_raised() {
        let e = classify_params(0.03, 0.005, 0.02);
        assert_eq!(e.label, ExpressionLabel::Happy);
        assert!((e.confidence - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_sad_corners_lowered() {
        let e = classify_params(0.03, 0.005, -0.02);
        assert_eq!(e.label, ExpressionLabel::Sad);
        assert!((e.confidence - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_pain_brows_lowered_mouth_slightly_open() {
        let e = classify_params(0.02, 0.025, 0.0);
        assert_eq!(e.label, ExpressionLabel::Pain);
        assert!((e.confidence - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_angry_brows_lowered_mouth_closed() {
        let e = classify_params(0.02, 0.005, 0.0);
        assert_eq!(e.label, ExpressionLabel::Angry);
    }

    #[test]
    fn test_confidence_clamped() {
        // Extreme surprise metrics must not exceed 0.9
        let e = classify_params(0.08, 0.08, 0.0);
        assert_eq!(e.label, ExpressionLabel::Surprised);
        assert!(e.confidence <= 0.9);
    }

    #[test]
    fn test_surprised_takes_precedence_over_happy() {
        let e = classify_params(0.05, 0.04, 0.03);
        assert_eq!(e.label, ExpressionLabel::Surprised);
    }
}
