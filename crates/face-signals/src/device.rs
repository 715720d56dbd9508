//! Mask / respirator color heuristic
//!
//! Crops the lower-face region (from 50% of face height below the bbox top
//! down to 120%, with 10% horizontal expansion), converts to HSV, and
//! measures the fraction of pixels falling in preset bands for common
//! medical device colors: white (surgical mask), cyan/blue (procedure
//! mask), green (oxygen mask).

use frame_capture::VideoFrame;
use inference::BoundingBox;

/// HSV band in OpenCV-style ranges: hue 0-180, saturation/value 0-255
struct HsvBand {
    h: (u8, u8),
    s: (u8, u8),
    v: (u8, u8),
}

const BANDS: [HsvBand; 3] = [
    // White
    HsvBand {
        h: (0, 180),
        s: (0, 50),
        v: (180, 255),
    },
    // Cyan / blue
    HsvBand {
        h: (80, 130),
        s: (40, 255),
        v: (40, 255),
    },
    // Green
    HsvBand {
        h: (40, 80),
        s: (40, 255),
        v: (40, 255),
    },
];

impl HsvBand {
    fn matches(&self, h: u8, s: u8, v: u8) -> bool {
        h >= self.h.0
            && h <= self.h.1
            && s >= self.s.0
            && s <= self.s.1
            && v >= self.v.0
            && v <= self.v.1
    }
}

/// RGB to HSV in OpenCV ranges (h 0-180, s 0-255, v 0-255)
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let rf = r as f32 / 255.0;
    let gf = g as f32 / 255.0;
    let bf = b as f32 / 255.0;
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };
    let h_deg = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (((gf - bf) / delta).rem_euclid(6.0))
    } else if max == gf {
        60.0 * ((bf - rf) / delta + 2.0)
    } else {
        60.0 * ((rf - gf) / delta + 4.0)
    };

    (
        (h_deg / 2.0).round().min(180.0) as u8,
        (s * 255.0).round() as u8,
        (v * 255.0).round() as u8,
    )
}

/// Detect a mask/respirator over the lower face.
///
/// Returns `(detected, pixel_fraction)`. An empty crop (face at the frame
/// edge) yields `(false, 0.0)`.
pub fn detect_mask_or_ventilator(
    frame: &VideoFrame,
    face_bbox: &BoundingBox,
    threshold: f32,
) -> (bool, f32) {
    let face_h = face_bbox.height();
    let face_w = face_bbox.width();

    let y1 = (face_bbox.y1 + face_h * 0.5) as i64;
    let y2 = (face_bbox.y2 + face_h * 0.2) as i64;
    let x1 = (face_bbox.x1 - face_w * 0.1) as i64;
    let x2 = (face_bbox.x2 + face_w * 0.1) as i64;

    let Some(region) = frame.crop_clamped(x1, y1, x2, y2) else {
        return (false, 0.0);
    };

    let total = (region.width * region.height) as f32;
    let mut matching = 0u32;
    for px in region.data.chunks_exact(3) {
        let (h, s, v) = rgb_to_hsv(px[0], px[1], px[2]);
        if BANDS.iter().any(|band| band.matches(h, s, v)) {
            matching += 1;
        }
    }

    let fraction = matching as f32 / total;
    (fraction > threshold, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_of(rgb: [u8; 3], w: u32, h: u32) -> VideoFrame {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for _ in 0..(w * h) {
            data.extend_from_slice(&rgb);
        }
        VideoFrame::new(data, w, h, 0, 0)
    }

    #[test]
    fn test_rgb_to_hsv_primaries() {
        assert_eq!(rgb_to_hsv(255, 0, 0), (0, 255, 255));
        let (h, s, v) = rgb_to_hsv(0, 255, 0);
        assert_eq!((h, s, v), (60, 255, 255));
        let (h, _, _) = rgb_to_hsv(0, 0, 255);
        assert_eq!(h, 120);
        assert_eq!(rgb_to_hsv(255, 255, 255), (0, 0, 255));
    }

    #[test]
    fn test_white_mask_detected() {
        let frame = frame_of([240, 240, 240], 100, 100);
        let face = BoundingBox::new(20.0, 10.0, 80.0, 50.0);
        let (detected, fraction) = detect_mask_or_ventilator(&frame, &face, 0.3);
        assert!(detected);
        assert!((fraction - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_blue_mask_detected() {
        // Procedure-mask blue
        let frame = frame_of([60, 120, 200], 100, 100);
        let face = BoundingBox::new(20.0, 10.0, 80.0, 50.0);
        let (detected, _) = detect_mask_or_ventilator(&frame, &face, 0.3);
        assert!(detected);
    }

    #[test]
    fn test_skin_tone_not_detected() {
        let frame = frame_of([190, 140, 110], 100, 100);
        let face = BoundingBox::new(20.0, 10.0, 80.0, 50.0);
        let (detected, fraction) = detect_mask_or_ventilator(&frame, &face, 0.3);
        assert!(!detected);
        assert!(fraction < 0.3);
    }

    #[test]
    fn test_face_outside_frame_is_negative() {
        let frame = frame_of([255, 255, 255], 50, 50);
        let face = BoundingBox::new(0.0, 49.0, 50.0, 51.0);
        // Lower-face band starts below the frame bottom
        let (detected, fraction) = detect_mask_or_ventilator(&frame, &face, 0.3);
        assert!(!detected);
        assert_eq!(fraction, 0.0);
    }
}
