//! Frame capture abstraction for the zone-presence pipeline
//!
//! Provides the RGB `VideoFrame` type shared by every downstream component
//! and the `FrameSource` trait that the detection loop owns. Concrete
//! sources (V4L2 device, RTSP stream, file playback) live outside the core;
//! the loop only needs "give me the next frame or tell me the stream ended".

pub mod frame;
pub mod source;

pub use frame::VideoFrame;
pub use source::FrameSource;

use thiserror::Error;

/// Capture error types
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The capture device could not be opened. Fatal for a detection run.
    #[error("Failed to open capture source: {0}")]
    Open(String),

    /// A frame read failed mid-stream.
    #[error("Frame read failed: {0}")]
    Read(String),

    #[error("Unsupported frame format: {0}")]
    Format(String),

    #[error("Frame encoding failed: {0}")]
    Encode(String),
}
