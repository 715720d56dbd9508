//! External model interfaces
//!
//! The detection loop treats both models as black boxes:
//! - object detector: frame in, list of {bbox, class, confidence} out
//! - landmark model: frame region in, normalized 2D landmark points out
//!
//! Concrete backends (ONNX runtimes, remote inference servers, test stubs)
//! implement the traits here. No timeout is enforced on either call; a slow
//! model stalls the tick that invoked it.

pub mod detection;

pub use detection::{filter_persons, BoundingBox, Detection, PERSON_CLASS_ID};

use frame_capture::VideoFrame;
use thiserror::Error;

/// Inference error types
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Model invocation failed: {0}")]
    Invocation(String),

    #[error("Model produced malformed output: {0}")]
    MalformedOutput(String),
}

/// Object detector interface.
///
/// One invocation per inference tick. A failed call may be retried once by
/// the caller with a defensively copied frame buffer.
pub trait ObjectDetector: Send {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<Detection>, InferenceError>;
}

/// Facial landmark model interface.
///
/// `analyze` runs against a region of the frame (a person detection) and
/// returns normalized (x, y) points in `[0, 1]` relative to that region, or
/// `None` when no face is found. Absence of landmarks is a null signal, not
/// an error.
pub trait LandmarkModel: Send {
    fn analyze(
        &mut self,
        frame: &VideoFrame,
        region: &BoundingBox,
    ) -> Result<Option<Vec<(f32, f32)>>, InferenceError>;
}
