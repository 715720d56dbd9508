//! Outbound stream message format
//!
//! Consumers (a UI or a bridge process) read one JSON object per message,
//! discriminated by a `type` tag.

use crate::pipeline::AnnotatedFrame;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use frame_capture::CaptureError;
use serde::{Deserialize, Serialize};
use zone_presence::{ZoneEvent, ZoneSnapshot, ZoneStatus};

/// One message on the outbound stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    /// Annotated display frame
    Frame {
        jpeg_base64: String,
        fps: f32,
        /// Capture timestamp, fractional seconds
        timestamp: f64,
    },
    /// Per-zone state snapshot. The counter goes out as `count`, the name
    /// display consumers read.
    Stats {
        zone_id: String,
        status: Option<ZoneStatus>,
        count: u32,
        occupied: bool,
    },
    /// Confirmed zone transition
    Event {
        #[serde(flatten)]
        event: ZoneEvent,
    },
}

impl StreamMessage {
    /// Encode an annotated frame for streaming.
    pub fn from_frame(frame: &AnnotatedFrame, jpeg_quality: u8) -> Result<Self, CaptureError> {
        let jpeg = frame.frame.to_jpeg(jpeg_quality)?;
        Ok(StreamMessage::Frame {
            jpeg_base64: STANDARD.encode(jpeg),
            fps: frame.fps,
            timestamp: frame.frame.timestamp_secs(),
        })
    }

    pub fn from_snapshot(snapshot: ZoneSnapshot) -> Self {
        StreamMessage::Stats {
            zone_id: snapshot.zone_id,
            status: snapshot.status,
            count: snapshot.occupancy_count,
            occupied: snapshot.occupied,
        }
    }

    pub fn from_event(event: ZoneEvent) -> Self {
        StreamMessage::Event { event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use frame_capture::VideoFrame;

    #[test]
    fn test_frame_message_round_trips_jpeg() {
        let annotated = AnnotatedFrame {
            frame: VideoFrame::new(vec![50u8; 8 * 8 * 3], 8, 8, 1_500_000_000, 3),
            fps: 24.5,
        };
        let msg = StreamMessage::from_frame(&annotated, 80).unwrap();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "frame");
        assert_eq!(json["fps"], 24.5);
        assert_eq!(json["timestamp"], 1.5);
        let jpeg = STANDARD
            .decode(json["jpeg_base64"].as_str().unwrap())
            .unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_stats_message_counter_named_count() {
        let msg = StreamMessage::from_snapshot(ZoneSnapshot {
            zone_id: "Z1".to_string(),
            status: Some(ZoneStatus::Present),
            occupancy_count: 2,
            occupied: true,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "stats");
        assert_eq!(json["zone_id"], "Z1");
        assert_eq!(json["status"], "present");
        assert_eq!(json["count"], 2);
        assert!(json.get("occupancy_count").is_none());
    }

    #[test]
    fn test_event_message_is_flat() {
        let msg = StreamMessage::from_event(ZoneEvent {
            zone_id: "door".to_string(),
            status: ZoneStatus::Absent,
            occupancy_count: 1,
            timestamp: Utc::now(),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "event");
        assert_eq!(json["zone_id"], "door");
        assert_eq!(json["status"], "absent");
    }
}
