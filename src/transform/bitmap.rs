//! Pixel-addressable bitmaps decoded from fetched image bytes

use image::RgbaImage;

use super::{Result, TransformError};

/// A decoded RGBA8 image the filters can read pixel by pixel
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pixels: RgbaImage,
}

impl Bitmap {
    /// Decode fetched image bytes (JPEG, PNG, WebP...)
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| TransformError::Decode(e.to_string()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Self::from_rgba(width, height, img.into_raw())
    }

    /// Wrap a raw RGBA8 buffer. Fails if the buffer does not cover width x height.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let len = pixels.len();
        let img = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            TransformError::PixelAccess(format!(
                "{} bytes cannot hold a {}x{} RGBA image",
                len, width, height
            ))
        })?;
        if width == 0 || height == 0 {
            return Err(TransformError::PixelAccess(format!(
                "empty bitmap ({}x{})",
                width, height
            )));
        }
        Ok(Self { pixels: img })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
