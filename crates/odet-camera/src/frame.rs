//! Raw frames and still-image encoding.

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;

use odet_models::Upload;

use crate::error::{CameraError, CameraResult};

/// JPEG quality used for captured frames.
pub const CAPTURE_JPEG_QUALITY: u8 = 80;

/// File name given to captured frames.
pub const CAPTURE_FILENAME: &str = "webcam-capture.jpg";

/// A single RGB8 frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB8 pixels, `width * height * 3` bytes
    pub data: Vec<u8>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.data.len())
            .finish()
    }
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(3)
    }

    /// Encode as a JPEG still ready for submission.
    pub fn to_upload(&self) -> CameraResult<Upload> {
        let bytes = encode_jpeg(self, CAPTURE_JPEG_QUALITY)?;
        Ok(Upload::new(CAPTURE_FILENAME, "image/jpeg", bytes))
    }
}

/// Encode an RGB8 frame as JPEG at the given quality (1-100).
pub fn encode_jpeg(frame: &Frame, quality: u8) -> CameraResult<Vec<u8>> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CameraError::Encode("frame has no pixels".to_string()));
    }
    if frame.expected_len() != Some(frame.data.len()) {
        return Err(CameraError::Encode(format!(
            "frame buffer is {} bytes, expected {}x{}x3",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    encoder
        .encode(&frame.data, frame.width, frame.height, ColorType::Rgb8)
        .map_err(|e| CameraError::Encode(e.to_string()))?;

    Ok(out)
}
