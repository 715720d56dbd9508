//! Eye and mouth aperture ratios with trailing-average smoothing

use crate::landmarks::{dist, LEFT_EYE, MOUTH_OUTER, RIGHT_EYE};
use std::collections::VecDeque;

/// Samples in the trailing moving average applied before thresholding
pub const SMOOTHING_SAMPLES: usize = 5;

const EPS: f32 = 1e-6;

/// EAR for one eye ring:
/// `(||p2-p6|| + ||p3-p5||) / (2 * ||p1-p4||)`
fn ear(points: &[(f32, f32)], ring: &[usize; 6]) -> f32 {
    let a = dist(points[ring[1]], points[ring[5]]);
    let b = dist(points[ring[2]], points[ring[4]]);
    let c = dist(points[ring[0]], points[ring[3]]);
    (a + b) / (2.0 * c + EPS)
}

/// Average EAR over both eyes
pub fn average_ear(points: &[(f32, f32)]) -> f32 {
    (ear(points, &LEFT_EYE) + ear(points, &RIGHT_EYE)) / 2.0
}

/// MAR over the outer lip ring:
/// `(||p2-p8|| + ||p3-p7|| + ||p4-p6||) / (3 * ||p1-p5||)`
pub fn mar(points: &[(f32, f32)]) -> f32 {
    let a = dist(points[MOUTH_OUTER[1]], points[MOUTH_OUTER[7]]);
    let b = dist(points[MOUTH_OUTER[2]], points[MOUTH_OUTER[6]]);
    let c = dist(points[MOUTH_OUTER[3]], points[MOUTH_OUTER[5]]);
    let d = dist(points[MOUTH_OUTER[0]], points[MOUTH_OUTER[4]]);
    (a + b + c) / (3.0 * d + EPS)
}

/// Fixed-size trailing moving average
#[derive(Debug)]
pub struct SmoothingWindow {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SmoothingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a sample and return the current mean over the window
    pub fn push(&mut self, value: f32) -> f32 {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
        self.mean()
    }

    pub fn mean(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::test_support::mesh_with;

    #[test]
    fn test_ear_matches_target() {
        let points = mesh_with(0.25, 0.1, 0.03, 0.005, 0.0);
        let got = average_ear(&points);
        assert!((got - 0.25).abs() < 1e-3, "ear = {got}");
    }

    #[test]
    fn test_mar_matches_target() {
        let points = mesh_with(0.3, 0.42, 0.03, 0.005, 0.0);
        let got = mar(&points);
        assert!((got - 0.42).abs() < 5e-3, "mar = {got}");
    }

    #[test]
    fn test_smoothing_window_below_threshold() {
        // 5 consecutive samples of 0.18 smooth to 0.18, below the 0.21
        // eyes-open threshold.
        let mut w = SmoothingWindow::new(SMOOTHING_SAMPLES);
        let mut smoothed = 0.0;
        for _ in 0..5 {
            smoothed = w.push(0.18);
        }
        assert!((smoothed - 0.18).abs() < 1e-6);
        assert!(smoothed <= 0.21);
    }

    #[test]
    fn test_smoothing_window_above_threshold() {
        let mut w = SmoothingWindow::new(SMOOTHING_SAMPLES);
        let mut smoothed = 0.0;
        for _ in 0..5 {
            smoothed = w.push(0.25);
        }
        assert!(smoothed > 0.21);
    }

    #[test]
    fn test_smoothing_window_evicts_oldest() {
        let mut w = SmoothingWindow::new(3);
        w.push(1.0);
        w.push(2.0);
        w.push(3.0);
        // 1.0 falls out
        let mean = w.push(4.0);
        assert!((mean - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_smoothing_blends_transition() {
        // A step change only crosses the threshold once the window majority
        // has caught up.
        let mut w = SmoothingWindow::new(5);
        for _ in 0..5 {
            w.push(0.30);
        }
        assert!(w.push(0.10) > 0.21); // [0.30 x4, 0.10]
        assert!(w.push(0.10) > 0.21); // [0.30 x3, 0.10 x2]
        assert!(w.push(0.10) < 0.21); // [0.30 x2, 0.10 x3]
    }
}
