//! FaceMesh landmark indices and geometry helpers
//!
//! Index constants follow the MediaPipe FaceMesh topology (468 points, 478
//! with iris refinement). The landmark model contract only promises "a set
//! of normalized 2D points"; these constants pin down which points the
//! signal computations read.

use inference::BoundingBox;

/// Minimum landmark count for the mesh indices below to be addressable
pub const MESH_LANDMARK_COUNT: usize = 468;

/// Left eye ring: p1..p6 for the EAR formula
pub const LEFT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];
/// Right eye ring: p1..p6 for the EAR formula
pub const RIGHT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
/// Outer lip ring; the MAR formula reads the first 8 as p1..p8
pub const MOUTH_OUTER: [usize; 12] = [61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, 308];
pub const LEFT_EYEBROW: [usize; 5] = [70, 63, 105, 66, 107];
pub const RIGHT_EYEBROW: [usize; 5] = [336, 296, 334, 293, 300];

/// Left / right mouth corners
pub const MOUTH_CORNER_LEFT: usize = 61;
pub const MOUTH_CORNER_RIGHT: usize = 291;
/// Upper / lower lip center
pub const MOUTH_TOP: usize = 13;
pub const MOUTH_BOTTOM: usize = 14;

pub(crate) fn dist(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

pub(crate) fn mean_y(points: &[(f32, f32)], indices: &[usize]) -> f32 {
    indices.iter().map(|&i| points[i].1).sum::<f32>() / indices.len() as f32
}

/// Face bounding box in absolute frame coordinates: landmark extents scaled
/// into the detection region.
pub fn face_bbox(points: &[(f32, f32)], region: &BoundingBox) -> BoundingBox {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for &(x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    BoundingBox::new(
        region.x1 + min_x * region.width(),
        region.y1 + min_y * region.height(),
        region.x1 + max_x * region.width(),
        region.y1 + max_y * region.height(),
    )
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    //! Synthetic mesh builders for signal tests

    use super::*;

    const EYE_LINE_Y: f32 = 0.40;
    const MOUTH_LINE_Y: f32 = 0.55;
    const EYE_SPAN: f32 = 0.1;
    const MOUTH_SPAN: f32 = 0.1;

    /// Build a full mesh producing the given metric values exactly.
    pub fn mesh_with(
        ear: f32,
        mar: f32,
        eyebrow_eye_dist: f32,
        mouth_opening: f32,
        corner_curl: f32,
    ) -> Vec<(f32, f32)> {
        let mut points = vec![(0.5f32, 0.5f32); MESH_LANDMARK_COUNT];

        // Eyes: horizontal span fixed, vertical pair distances chosen so
        // (A + B) / (2C) = ear, with the ring mean staying on the eye line.
        let v = EYE_SPAN * ear;
        for (ring, x0) in [(LEFT_EYE, 0.30f32), (RIGHT_EYE, 0.60f32)] {
            points[ring[0]] = (x0, EYE_LINE_Y);
            points[ring[3]] = (x0 + EYE_SPAN, EYE_LINE_Y);
            points[ring[1]] = (x0 + 0.03, EYE_LINE_Y - v / 2.0);
            points[ring[5]] = (x0 + 0.03, EYE_LINE_Y + v / 2.0);
            points[ring[2]] = (x0 + 0.07, EYE_LINE_Y - v / 2.0);
            points[ring[4]] = (x0 + 0.07, EYE_LINE_Y + v / 2.0);
        }

        // Eyebrows sit above the eye line by the requested distance.
        for (i, &idx) in LEFT_EYEBROW.iter().chain(RIGHT_EYEBROW.iter()).enumerate() {
            points[idx] = (0.30 + i as f32 * 0.04, EYE_LINE_Y - eyebrow_eye_dist);
        }

        // Mouth ring: (A + B + C) / (3D) = mar.
        let mv = MOUTH_SPAN * mar;
        points[MOUTH_OUTER[0]] = (0.40, MOUTH_LINE_Y);
        points[MOUTH_OUTER[4]] = (0.40 + MOUTH_SPAN, MOUTH_LINE_Y);
        for (k, x) in [(1usize, 0.42f32), (2, 0.45), (3, 0.48)] {
            points[MOUTH_OUTER[k]] = (x, MOUTH_LINE_Y - mv / 2.0);
            points[MOUTH_OUTER[8 - k]] = (x, MOUTH_LINE_Y + mv / 2.0);
        }

        // Lip centers and corners for the expression metrics.
        let top_y = MOUTH_LINE_Y - mouth_opening / 2.0;
        points[MOUTH_TOP] = (0.45, top_y);
        points[MOUTH_BOTTOM] = (0.45, MOUTH_LINE_Y + mouth_opening / 2.0);
        let corner_y = top_y - corner_curl;
        points[MOUTH_CORNER_LEFT] = (0.40, corner_y);
        points[MOUTH_CORNER_RIGHT] = (0.50, corner_y);

        points
    }

    /// Neutral face: eyes comfortably open, mouth closed, relaxed brows.
    pub fn neutral_mesh() -> Vec<(f32, f32)> {
        mesh_with(0.30, 0.10, 0.03, 0.005, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_bbox_scales_into_region() {
        let points = vec![(0.0, 0.0), (1.0, 0.5), (0.5, 1.0)];
        let region = BoundingBox::new(100.0, 200.0, 300.0, 600.0);
        let bbox = face_bbox(&points, &region);
        assert_eq!(bbox.x1, 100.0);
        assert_eq!(bbox.y1, 200.0);
        assert_eq!(bbox.x2, 300.0);
        assert_eq!(bbox.y2, 600.0);
    }
}
