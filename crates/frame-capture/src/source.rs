//! Capture source trait

use crate::{CaptureError, VideoFrame};

/// A source of video frames owned by the detection loop.
///
/// Implementations are expected to block in `read_frame` until a frame is
/// available. `Ok(None)` signals end-of-stream and terminates the loop
/// cleanly; `Err` is reserved for device faults.
///
/// Construction is the "open" step: a source that cannot reach its device
/// must fail at construction time so session start can report it
/// synchronously.
pub trait FrameSource: Send {
    /// Read the next frame, blocking until one is available.
    fn read_frame(&mut self) -> Result<Option<VideoFrame>, CaptureError>;

    /// Human-readable identifier for logs (device path, URL, ...)
    fn describe(&self) -> String {
        "unnamed source".to_string()
    }
}
