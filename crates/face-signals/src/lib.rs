//! Derived facial signals
//!
//! Given normalized FaceMesh landmark points for one detected person,
//! computes:
//! - eye aperture ratio (EAR) and open/closed state
//! - mouth aperture ratio (MAR) and closed/speaking/wide-open state
//! - rule-based coarse expression classification
//! - mask/respirator color heuristic over the lower face
//!
//! "No landmarks" yields no signal at all. Callers must treat the absence of
//! a `FaceSignal` as "nothing known", never as "device absent" or
//! "expression neutral".

pub mod aperture;
pub mod device;
pub mod expression;
pub mod landmarks;

pub use aperture::SmoothingWindow;
pub use expression::{Expression, ExpressionLabel};

use frame_capture::VideoFrame;
use inference::BoundingBox;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Signal computation error types
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Region crop fell outside the frame")]
    EmptyRegion,
}

/// Mouth openness classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouthState {
    Closed,
    Speaking,
    WideOpen,
}

/// Derived signals for one face on one inference tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceSignal {
    /// Face bounding box in absolute frame coordinates, derived from the
    /// landmark extents
    pub face_bbox: BoundingBox,
    pub eyes_open: bool,
    /// Smoothed eye aperture ratio
    pub ear: f32,
    pub mouth_state: MouthState,
    /// Smoothed mouth aperture ratio
    pub mar: f32,
    pub expression: Expression,
    pub mask_or_device_detected: bool,
    pub device_confidence: f32,
}

/// Signal thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Smoothed EAR above this means eyes open
    pub ear_threshold: f32,
    /// Smoothed MAR above this means speaking
    pub mar_speak_threshold: f32,
    /// Smoothed MAR above this means wide open (yawn, pain)
    pub mar_open_threshold: f32,
    /// Lower-face mask-color pixel fraction above this flags a device
    pub ventilator_threshold: f32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.21,
            mar_speak_threshold: 0.3,
            mar_open_threshold: 0.5,
            ventilator_threshold: 0.3,
        }
    }
}

/// Stateful face signal computer.
///
/// Holds the EAR/MAR smoothing windows, which persist across ticks; all
/// other outputs are derived fresh from the given landmarks.
pub struct FaceSignalAnalyzer {
    config: SignalConfig,
    ear_window: SmoothingWindow,
    mar_window: SmoothingWindow,
}

impl FaceSignalAnalyzer {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            config,
            ear_window: SmoothingWindow::new(aperture::SMOOTHING_SAMPLES),
            mar_window: SmoothingWindow::new(aperture::SMOOTHING_SAMPLES),
        }
    }

    /// Compute signals for one face.
    ///
    /// `points` are normalized landmark coordinates relative to `region`
    /// (the person detection crop). Returns `None` when the landmark set is
    /// too small to index, which callers treat as a null signal.
    pub fn analyze(
        &mut self,
        frame: &VideoFrame,
        region: &BoundingBox,
        points: &[(f32, f32)],
    ) -> Option<FaceSignal> {
        if points.len() < landmarks::MESH_LANDMARK_COUNT {
            warn!(
                got = points.len(),
                need = landmarks::MESH_LANDMARK_COUNT,
                "landmark set too small, treating as null signal"
            );
            return None;
        }

        let ear = aperture::average_ear(points);
        let ear_smoothed = self.ear_window.push(ear);
        let eyes_open = ear_smoothed > self.config.ear_threshold;

        let mar = aperture::mar(points);
        let mar_smoothed = self.mar_window.push(mar);
        let mouth_state = if mar_smoothed > self.config.mar_open_threshold {
            MouthState::WideOpen
        } else if mar_smoothed > self.config.mar_speak_threshold {
            MouthState::Speaking
        } else {
            MouthState::Closed
        };

        let expression = expression::classify(points);

        let face_bbox = landmarks::face_bbox(points, region);
        let (mask_detected, device_confidence) =
            device::detect_mask_or_ventilator(frame, &face_bbox, self.config.ventilator_threshold);

        Some(FaceSignal {
            face_bbox,
            eyes_open,
            ear: ear_smoothed,
            mouth_state,
            mar: mar_smoothed,
            expression,
            mask_or_device_detected: mask_detected,
            device_confidence,
        })
    }

    /// Drop the smoothing history (zone-set replacement, session restart)
    pub fn reset(&mut self) {
        self.ear_window.clear();
        self.mar_window.clear();
    }
}
