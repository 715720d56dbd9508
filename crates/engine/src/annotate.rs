//! Display frame annotation
//!
//! Draws zone outlines, person detection boxes, and face overlays onto a
//! copy of the frame. Runs every display tick, including ticks that reuse
//! stale detections.

use face_signals::FaceSignal;
use frame_capture::VideoFrame;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use inference::{BoundingBox, Detection};
use std::collections::HashMap;
use zone_presence::ZoneDef;

const ZONE_OCCUPIED: Rgb<u8> = Rgb([0, 255, 0]);
const ZONE_VACANT: Rgb<u8> = Rgb([220, 60, 60]);
const PERSON_BOX: Rgb<u8> = Rgb([60, 120, 255]);
const FACE_BOX: Rgb<u8> = Rgb([255, 220, 0]);
const FACE_BOX_MASKED: Rgb<u8> = Rgb([0, 220, 220]);

/// Render all overlays onto a copy of `frame`.
pub fn annotate_frame(
    frame: &VideoFrame,
    zones: &[ZoneDef],
    occupancy: &HashMap<String, bool>,
    detections: &[Detection],
    signals: &[FaceSignal],
) -> VideoFrame {
    let Some(mut image) = RgbImage::from_raw(frame.width, frame.height, frame.data.clone()) else {
        return frame.clone();
    };

    for zone in zones.iter().filter(|z| z.enabled) {
        let color = if occupancy.get(&zone.id).copied().unwrap_or(false) {
            ZONE_OCCUPIED
        } else {
            ZONE_VACANT
        };
        draw_polygon_outline(&mut image, &zone.points, color);
    }

    for det in detections {
        draw_bbox(&mut image, &det.bbox, PERSON_BOX);
    }

    for signal in signals {
        let color = if signal.mask_or_device_detected {
            FACE_BOX_MASKED
        } else {
            FACE_BOX
        };
        draw_bbox(&mut image, &signal.face_bbox, color);
    }

    VideoFrame::new(
        image.into_raw(),
        frame.width,
        frame.height,
        frame.timestamp_ns,
        frame.sequence,
    )
}

fn draw_polygon_outline(image: &mut RgbImage, points: &[[i32; 2]], color: Rgb<u8>) {
    let n = points.len();
    if n < 2 {
        return;
    }
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        draw_line_segment_mut(
            image,
            (a[0] as f32, a[1] as f32),
            (b[0] as f32, b[1] as f32),
            color,
        );
    }
}

fn draw_bbox(image: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
    let x = bbox.x1.round() as i32;
    let y = bbox.y1.round() as i32;
    let w = bbox.width().round().max(1.0) as u32;
    let h = bbox.height().round().max(1.0) as u32;
    draw_hollow_rect_mut(image, Rect::at(x, y).of_size(w, h), color);
}
