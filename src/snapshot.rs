//! Still-frame encoding.
//!
//! Turns a raw RGB [`Frame`] into the JPEG data URI the panel displays.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::camera::Frame;
use crate::data_uri::{self, DataUriError};

/// Media type of every snapshot.
pub const SNAPSHOT_MIME: &str = "image/jpeg";

/// Default JPEG quality (0-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Errors that can occur while taking a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("No frame captured yet")]
    NoFrame,

    #[error("Frame buffer does not match {width}x{height} RGB")]
    BadFrame { width: u32, height: u32 },

    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Malformed snapshot data: {0}")]
    Malformed(#[from] DataUriError),
}

/// Encode a frame as JPEG bytes.
///
/// `quality` is clamped to 1-100.
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>, SnapshotError> {
    let bad_frame = || SnapshotError::BadFrame {
        width: frame.width,
        height: frame.height,
    };
    if frame.width == 0 || frame.height == 0 {
        return Err(bad_frame());
    }
    let img = RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(bad_frame)?;

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)).encode_image(&img)?;
    Ok(buf)
}

/// Encode a frame as a `data:image/jpeg;base64,...` URI.
pub fn frame_to_data_uri(frame: &Frame, quality: u8) -> Result<String, SnapshotError> {
    let jpeg = encode_jpeg(frame, quality)?;
    Ok(data_uri::encode(SNAPSHOT_MIME, &jpeg))
}
