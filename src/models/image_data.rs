use serde::{Deserialize, Serialize};

use crate::error::ImageError;
use crate::utils::grayscale::{invert, rgba_to_luma, rgba_to_luma_parallel};

/// Frames at or above this pixel count are converted to luminance with rayon
const PARALLEL_LUMA_THRESHOLD: usize = 1 << 20;

/// RGBA pixel buffer as carried by a `detect` request
///
/// `data` is row-major, 4 bytes per pixel. The layout matches the browser
/// `ImageData` object so requests serialized by a JS host deserialize as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// RGBA bytes
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Wrap an RGBA buffer without validating it
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// Convert any decoded `image` crate picture into RGBA image data
    pub fn from_dynamic(image: &image::DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(rgba.into_raw(), width, height)
    }

    /// Number of pixels described by the dimensions, saturating at `usize::MAX`
    pub fn pixel_count(&self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// RGBA byte length the dimensions call for, `None` if it overflows
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(4)
    }

    /// Check dimensions and buffer length before anything reads the pixels.
    pub fn validate(&self, max_pixels: usize) -> Result<(), ImageError> {
        if self.width == 0 || self.height == 0 {
            return Err(ImageError::EmptyDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let pixels = self.pixel_count();
        if pixels > max_pixels {
            return Err(ImageError::TooLarge {
                pixels,
                limit: max_pixels,
            });
        }

        let Some(expected) = self.expected_len() else {
            return Err(ImageError::TooLarge {
                pixels,
                limit: max_pixels,
            });
        };
        if self.data.len() != expected {
            return Err(ImageError::BufferLength {
                width: self.width,
                height: self.height,
                expected,
                actual: self.data.len(),
            });
        }

        Ok(())
    }

    /// Convert to an 8-bit luminance image. Call [`ImageData::validate`] first.
    pub fn to_luma(&self) -> LumaImage {
        let width = self.width as usize;
        let height = self.height as usize;
        let data = if self.pixel_count() >= PARALLEL_LUMA_THRESHOLD {
            rgba_to_luma_parallel(&self.data, width, height)
        } else {
            rgba_to_luma(&self.data, width, height)
        };
        LumaImage {
            data,
            width,
            height,
        }
    }
}

/// Single-channel image handed to decoder backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaImage {
    /// Luminance bytes, row-major
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl LumaImage {
    /// Luminance at (x, y); callers stay in bounds
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Photographic negative, for light-on-dark symbols
    pub fn inverted(&self) -> Self {
        Self {
            data: invert(&self.data),
            width: self.width,
            height: self.height,
        }
    }
}
