//! Video frame type and pixel operations

use crate::CaptureError;
use image::codecs::jpeg::JpegEncoder;
use image::ImageEncoder;

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ns: u64, sequence: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Crop a region of the frame. Returns `None` if the region exceeds
    /// the frame bounds.
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Option<VideoFrame> {
        if w == 0 || h == 0 || x + w > self.width || y + h > self.height {
            return None;
        }

        let mut cropped = Vec::with_capacity((w * h * 3) as usize);
        for row in y..(y + h) {
            let start = ((row * self.width + x) * 3) as usize;
            let end = start + (w * 3) as usize;
            cropped.extend_from_slice(&self.data[start..end]);
        }

        Some(VideoFrame {
            data: cropped,
            width: w,
            height: h,
            timestamp_ns: self.timestamp_ns,
            sequence: self.sequence,
        })
    }

    /// Crop a region clamped to the frame bounds. Signed coordinates let
    /// callers expand a box past the frame edge without pre-clamping.
    pub fn crop_clamped(&self, x1: i64, y1: i64, x2: i64, y2: i64) -> Option<VideoFrame> {
        let x1 = x1.clamp(0, self.width as i64) as u32;
        let y1 = y1.clamp(0, self.height as i64) as u32;
        let x2 = x2.clamp(0, self.width as i64) as u32;
        let y2 = y2.clamp(0, self.height as i64) as u32;
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        self.crop(x1, y1, x2 - x1, y2 - y1)
    }

    /// Encode the frame as JPEG
    pub fn to_jpeg(&self, quality: u8) -> Result<Vec<u8>, CaptureError> {
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, quality);
        encoder
            .write_image(
                &self.data,
                self.width,
                self.height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
        Ok(out)
    }

    /// Timestamp in fractional seconds since capture epoch
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1e9
    }
}
