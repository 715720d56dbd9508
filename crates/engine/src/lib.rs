//! Detection engine and session lifecycle
//!
//! Wires capture, inference, zone presence, face signals, and dispatch into
//! one loop running on a blocking worker thread. The display rate follows
//! the capture source; inference runs on its own configured cadence, with
//! stale detections reused in between.

pub mod annotate;
pub mod config;
pub mod pipeline;
pub mod queues;
pub mod session;
pub mod stream;

pub use config::EngineConfig;
pub use pipeline::{AnnotatedFrame, DetectionEngine};
pub use queues::{
    BoundedQueue, OutputChannels, EVENT_QUEUE_CAPACITY, FRAME_QUEUE_CAPACITY, STATS_QUEUE_CAPACITY,
};
pub use session::DetectionSession;
pub use stream::StreamMessage;

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Configuration load failed: {0}")]
    ConfigFile(#[from] ::config::ConfigError),

    #[error(transparent)]
    Zone(#[from] zone_presence::ZoneError),

    #[error(transparent)]
    Capture(#[from] frame_capture::CaptureError),

    #[error(transparent)]
    Dispatch(#[from] dispatch::DispatchError),
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
