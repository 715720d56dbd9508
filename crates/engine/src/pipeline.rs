//! The detection loop
//!
//! One tick per captured frame. Inference runs only when the detection
//! interval has elapsed; in between, the previous detections are reused so
//! the display rate stays decoupled from inference cost. Presence state
//! machines, face signals, and outbound dispatch all advance on inference
//! ticks; annotation and FPS tracking advance on every tick.

use crate::annotate;
use crate::config::EngineConfig;
use crate::queues::OutputChannels;
use crate::EngineError;
use dispatch::{EventDispatcher, EventKind};
use face_signals::{ExpressionLabel, FaceSignal, FaceSignalAnalyzer};
use frame_capture::{FrameSource, VideoFrame};
use inference::{filter_persons, Detection, InferenceError, LandmarkModel, ObjectDetector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use zone_presence::{validate_zone_set, PresenceTracker, ZoneDef};

/// Sad-expression confidence below this never triggers a notification
const SAD_CONFIDENCE_CUTOFF: f32 = 0.6;

/// Key used for signal events from faces outside every zone
const NO_ZONE_KEY: &str = "frame";

/// A display frame with its overlays already rendered
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    pub frame: VideoFrame,
    /// Measured display rate at the time this frame was produced
    pub fps: f32,
}

/// Display-rate counter over a rolling one-second window
#[derive(Debug, Default)]
struct FpsCounter {
    window_start: Option<Instant>,
    frames: u32,
    current: f32,
}

impl FpsCounter {
    fn tick(&mut self, now: Instant) -> f32 {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        let elapsed = now.duration_since(start);
        if elapsed >= Duration::from_secs(1) {
            self.current = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = Some(now);
        }
        self.current
    }
}

/// The synchronous detection engine. Owns the capture source, the models,
/// the per-zone trackers, and the producer side of the output queues.
///
/// Runs on a blocking worker thread; see `DetectionSession` for lifecycle.
pub struct DetectionEngine {
    config: EngineConfig,
    source: Box<dyn FrameSource>,
    detector: Box<dyn ObjectDetector>,
    landmarks: Option<Box<dyn LandmarkModel>>,
    zones: Vec<ZoneDef>,
    trackers: HashMap<String, PresenceTracker>,
    analyzer: FaceSignalAnalyzer,
    dispatcher: EventDispatcher,
    outputs: OutputChannels,
    fps: FpsCounter,
    fps_shared: Arc<AtomicU32>,
    /// Person detections from the last successful inference tick
    detections: Vec<Detection>,
    /// Face signals from the last inference tick, kept for annotation
    signals: Vec<FaceSignal>,
    /// Raw per-zone occupancy as of the last inference tick
    occupancy: HashMap<String, bool>,
    last_inference: Option<Instant>,
}

impl DetectionEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: EngineConfig,
        zones: Vec<ZoneDef>,
        source: Box<dyn FrameSource>,
        detector: Box<dyn ObjectDetector>,
        landmarks: Option<Box<dyn LandmarkModel>>,
        dispatcher: EventDispatcher,
        outputs: OutputChannels,
        fps_shared: Arc<AtomicU32>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        validate_zone_set(&zones)?;

        if config.enable_face_analysis && landmarks.is_none() {
            warn!("face analysis enabled but no landmark model provided, signals disabled");
        }

        let trackers = zones
            .iter()
            .filter(|z| z.enabled)
            .map(|z| {
                (
                    z.id.clone(),
                    PresenceTracker::new(
                        z.id.clone(),
                        config.presence_threshold(),
                        config.absence_threshold(),
                    ),
                )
            })
            .collect();

        let analyzer = FaceSignalAnalyzer::new(config.signal_config());

        Ok(Self {
            config,
            source,
            detector,
            landmarks,
            zones,
            trackers,
            analyzer,
            dispatcher,
            outputs,
            fps: FpsCounter::default(),
            fps_shared,
            detections: Vec::new(),
            signals: Vec::new(),
            occupancy: HashMap::new(),
            last_inference: None,
        })
    }

    /// Run the capture loop until the source ends, a read fails, or the
    /// running flag is cleared. Clears the flag itself on exit so callers
    /// can observe completion.
    pub fn run(&mut self, running: Arc<AtomicBool>) {
        info!(
            source = %self.source.describe(),
            zones = self.zones.len(),
            interval_s = self.config.detection_interval_seconds,
            "detection loop started"
        );

        while running.load(Ordering::Relaxed) {
            let frame = match self.source.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("capture source reached end of stream");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "frame read failed, stopping loop");
                    break;
                }
            };
            self.tick(&frame, Instant::now());
        }

        running.store(false, Ordering::Relaxed);
        info!("detection loop stopped");
    }

    /// Advance one display tick.
    fn tick(&mut self, frame: &VideoFrame, now: Instant) {
        let inference_due = self
            .last_inference
            .map_or(true, |t| now.duration_since(t) >= self.config.detection_interval());

        if inference_due {
            // A failed tick still consumes its inference slot, otherwise a
            // broken model would be re-invoked at display rate.
            self.last_inference = Some(now);
            match self.invoke_detector(frame) {
                Ok(raw) => {
                    self.detections = filter_persons(raw, self.config.confidence_threshold);
                    self.update_presence(now);
                    if self.config.enable_face_analysis {
                        self.analyze_faces(frame, now);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "inference failed twice, reusing previous detections");
                }
            }
        }

        let annotated = annotate::annotate_frame(
            frame,
            &self.zones,
            &self.occupancy,
            &self.detections,
            &self.signals,
        );
        let fps = self.fps.tick(now);
        self.fps_shared.store(fps.to_bits(), Ordering::Relaxed);
        self.outputs.frames.push_rotate(AnnotatedFrame {
            frame: annotated,
            fps,
        });
    }

    /// Invoke the detector, retrying once on a copied frame buffer.
    fn invoke_detector(&mut self, frame: &VideoFrame) -> Result<Vec<Detection>, InferenceError> {
        match self.detector.detect(frame) {
            Ok(detections) => Ok(detections),
            Err(first) => {
                warn!(error = %first, "detector invocation failed, retrying once");
                let copy = frame.clone();
                self.detector.detect(&copy)
            }
        }
    }

    /// Feed raw occupancy into every zone's state machine and publish any
    /// confirmed transitions.
    fn update_presence(&mut self, now: Instant) {
        let centers: Vec<(f32, f32)> = self.detections.iter().map(|d| d.bbox.center()).collect();

        let occupied_by_zone: Vec<(String, bool)> = self
            .zones
            .iter()
            .filter(|z| z.enabled)
            .map(|zone| {
                let occupied = centers.iter().any(|&(x, y)| zone.contains(x, y));
                (zone.id.clone(), occupied)
            })
            .collect();

        for (zone_id, occupied) in occupied_by_zone {
            self.occupancy.insert(zone_id.clone(), occupied);
            let Some(tracker) = self.trackers.get_mut(&zone_id) else {
                continue;
            };
            if let Some(event) = tracker.observe(occupied, now) {
                info!(
                    zone = %event.zone_id,
                    status = ?event.status,
                    count = event.occupancy_count,
                    "zone transition confirmed"
                );
                self.dispatcher.dispatch_zone_event(&event, now);
                self.outputs.events.push_drop(event);
            }
            self.outputs.stats.push_drop(tracker.snapshot());
        }
    }

    /// Run the landmark model over each detected person and refresh the
    /// signal set. Sustained sad expressions above the confidence cutoff go
    /// to the dispatcher, keyed by the zone the face sits in.
    fn analyze_faces(&mut self, frame: &VideoFrame, now: Instant) {
        let Some(model) = self.landmarks.as_mut() else {
            self.signals.clear();
            return;
        };

        let mut collected: Vec<(FaceSignal, Option<String>)> = Vec::new();
        for det in &self.detections {
            let (cx, cy) = det.bbox.center();
            let zone_id = self
                .zones
                .iter()
                .find(|z| z.enabled && z.contains(cx, cy))
                .map(|z| z.id.clone());

            if self.config.face_analysis_roi_only && zone_id.is_none() {
                continue;
            }

            match model.analyze(frame, &det.bbox) {
                Ok(Some(points)) => {
                    if let Some(signal) = self.analyzer.analyze(frame, &det.bbox, &points) {
                        collected.push((signal, zone_id));
                    }
                }
                Ok(None) => debug!("no face found in detection region"),
                Err(e) => warn!(error = %e, "landmark model failed, null signal"),
            }
        }

        for (signal, zone_id) in &collected {
            if signal.expression.label == ExpressionLabel::Sad
                && signal.expression.confidence >= SAD_CONFIDENCE_CUTOFF
            {
                let zone = zone_id.as_deref().unwrap_or(NO_ZONE_KEY);
                let count = self
                    .trackers
                    .get(zone)
                    .map(|t| t.occupancy_count())
                    .unwrap_or(0);
                info!(
                    zone,
                    confidence = signal.expression.confidence,
                    "sustained sad expression"
                );
                self.dispatcher
                    .dispatch_signal_event(zone, EventKind::SadExpression, "sad", count, now);
            }
        }

        self.signals = collected.into_iter().map(|(s, _)| s).collect();
    }
}
