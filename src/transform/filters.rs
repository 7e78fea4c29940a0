//! Grayscale and blur filters
//!
//! Both filters are pure: they read the source bitmap, build a new pixel
//! buffer and encode it. The source is never modified.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{imageops, DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use super::{Bitmap, Encoding, Result, TransformError};
use crate::state::data::EncodedImage;

/// Blur radius used when the caller doesn't pick one
pub const DEFAULT_BLUR_RADIUS: u32 = 10;

/// Replace R, G and B with their unweighted mean. Alpha is untouched.
pub fn to_grayscale(bitmap: &Bitmap, encoding: Encoding) -> Result<EncodedImage> {
    let gray = grayscale_pixels(bitmap.pixels());
    encode(&gray, encoding)
}

/// Gaussian blur with the given radius (used as the standard deviation)
pub fn apply_blur(bitmap: &Bitmap, radius: u32, encoding: Encoding) -> Result<EncodedImage> {
    let blurred = blur_pixels(bitmap.pixels(), radius);
    encode(&blurred, encoding)
}

fn grayscale_pixels(src: &RgbaImage) -> RgbaImage {
    let mut out = src.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let mean = ((r as u16 + g as u16 + b as u16) as f32 / 3.0).round() as u8;
        pixel.0 = [mean, mean, mean, a];
    }
    out
}

fn blur_pixels(src: &RgbaImage, radius: u32) -> RgbaImage {
    // sigma 0 is a no-op, the image crate rejects it
    if radius == 0 {
        return src.clone();
    }
    imageops::blur(src, radius as f32)
}

/// Encode a pixel buffer as a single still frame
pub fn encode(img: &RgbaImage, encoding: Encoding) -> Result<EncodedImage> {
    let mut bytes = Vec::new();

    match encoding {
        Encoding::Jpeg { quality } => {
            let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                .map_err(|e| TransformError::Encode(e.to_string()))?;
        }
        Encoding::Png => {
            PngEncoder::new(&mut bytes)
                .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
                .map_err(|e| TransformError::Encode(e.to_string()))?;
        }
    }

    Ok(EncodedImage {
        bytes,
        format: encoding.format(),
    })
}
