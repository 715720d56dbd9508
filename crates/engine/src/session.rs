//! Session lifecycle
//!
//! A session wraps one `DetectionEngine` run on a blocking worker thread.
//! Configuration and zone errors surface synchronously from `start`; a
//! capture source that cannot open its device fails before `start` is ever
//! called, since opening happens at source construction.

use crate::config::EngineConfig;
use crate::pipeline::{AnnotatedFrame, DetectionEngine};
use crate::queues::OutputChannels;
use crate::EngineError;
use dispatch::EventDispatcher;
use frame_capture::FrameSource;
use inference::{LandmarkModel, ObjectDetector};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use zone_presence::{ZoneDef, ZoneEvent, ZoneSnapshot};

/// Handle to a running detection session.
///
/// The worker owns the source, models, and trackers; this handle holds the
/// consumer side of the output queues and the stop flag.
pub struct DetectionSession {
    running: Arc<AtomicBool>,
    worker: Option<tokio::task::JoinHandle<()>>,
    outputs: OutputChannels,
    fps_shared: Arc<AtomicU32>,
}

impl DetectionSession {
    /// Validate and start a session. Must be called from within a tokio
    /// runtime.
    ///
    /// Invalid configuration or a malformed zone set fails here, before the
    /// worker starts.
    pub fn start(
        config: EngineConfig,
        zones: Vec<ZoneDef>,
        source: Box<dyn FrameSource>,
        detector: Box<dyn ObjectDetector>,
        landmarks: Option<Box<dyn LandmarkModel>>,
    ) -> Result<Self, EngineError> {
        let dispatcher = EventDispatcher::spawn(config.dispatcher_config())?;
        let outputs = OutputChannels::new();
        let fps_shared = Arc::new(AtomicU32::new(0));

        let mut engine = DetectionEngine::new(
            config,
            zones,
            source,
            detector,
            landmarks,
            dispatcher,
            outputs.clone(),
            fps_shared.clone(),
        )?;

        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let worker = tokio::task::spawn_blocking(move || engine.run(flag));
        info!("detection session started");

        Ok(Self {
            running,
            worker: Some(worker),
            outputs,
            fps_shared,
        })
    }

    /// True while the worker loop is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Signal the worker to stop and wait for it, up to `timeout`.
    ///
    /// Returns `true` when the worker exited within the timeout. On timeout
    /// the worker is abandoned; it will still exit after its current
    /// blocking read returns.
    pub async fn stop(&mut self, timeout: Duration) -> bool {
        self.running.store(false, Ordering::Relaxed);
        let Some(worker) = self.worker.take() else {
            return true;
        };
        match tokio::time::timeout(timeout, worker).await {
            Ok(_) => {
                info!("detection session stopped");
                true
            }
            Err(_) => {
                warn!("worker did not stop within timeout, abandoning");
                false
            }
        }
    }

    /// Pop the oldest queued display frame, if any.
    pub fn latest_frame(&self) -> Option<AnnotatedFrame> {
        self.outputs.frames.try_pop()
    }

    /// Drain all queued zone snapshots, oldest first.
    pub fn drain_stats(&self) -> Vec<ZoneSnapshot> {
        self.outputs.stats.drain()
    }

    /// Drain all queued zone events, oldest first.
    pub fn drain_events(&self) -> Vec<ZoneEvent> {
        self.outputs.events.drain()
    }

    /// Most recently measured display rate.
    pub fn fps(&self) -> f32 {
        f32::from_bits(self.fps_shared.load(Ordering::Relaxed))
    }
}
