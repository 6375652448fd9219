//! Captured camera frames.
//!
//! A [`Frame`] is a single still grabbed from the live camera preview when
//! the user taps the capture button. Frames are RGBA, 4 bytes per pixel,
//! row-major, which is what a 2D canvas `getImageData` hands back.

use thiserror::Error;

/// Errors that can occur when building a frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The pixel buffer does not match the frame dimensions.
    #[error("Invalid frame data: expected {expected} bytes, got {actual}")]
    InvalidFrameData {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },

    /// The camera has not produced any pixels yet.
    #[error("Frame has zero size ({width}x{height})")]
    Empty {
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
    },
}

/// A still image captured from the camera, in RGBA format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Width of the frame in pixels.
    pub width: u32,
    /// Height of the frame in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel, row-major order).
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a new frame from RGBA data.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the data length
    /// doesn't match `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }

        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(FrameError::InvalidFrameData {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A solid dark frame, what the preview shows before the camera warms up.
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&[32, 32, 32, 255]);
        }

        Self {
            width,
            height,
            data,
        }
    }

    /// Number of pixels in the frame.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Iterate the red channel, one byte per pixel.
    pub fn red_channel(&self) -> impl Iterator<Item = u8> + '_ {
        self.data.chunks_exact(4).map(|px| px[0])
    }
}
