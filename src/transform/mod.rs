/// Client-side pixel transforms
///
/// This module handles:
/// - Decoding fetched image bytes into a pixel-addressable bitmap (bitmap.rs)
/// - Grayscale and blur filters plus output encoding (filters.rs)
/// - Running a filter off the UI thread

pub mod bitmap;
pub mod filters;

use thiserror::Error;

use crate::state::data::{EncodedImage, ImageFormat};

pub use bitmap::Bitmap;
pub use filters::{apply_blur, to_grayscale, DEFAULT_BLUR_RADIUS};

/// Errors a transform can report. None of them touch the displayed image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The pixel buffer could not be read (missing, truncated or empty)
    #[error("pixel data unavailable: {0}")]
    PixelAccess(String),

    /// The source bytes are not a decodable image
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The output could not be encoded
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// The blocking worker panicked or was cancelled
    #[error("transform worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, TransformError>;

/// Output encoding of a transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Lossy, fixed quality (1-100). Transparency is flattened.
    Jpeg { quality: u8 },
    /// Lossless, keeps the alpha channel
    Png,
}

impl Encoding {
    pub fn format(&self) -> ImageFormat {
        match self {
            Encoding::Jpeg { .. } => ImageFormat::Jpeg,
            Encoding::Png => ImageFormat::Png,
        }
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Jpeg { quality: 90 }
    }
}

/// A filter the detail view can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Grayscale,
    Blur { radius: u32 },
}

impl Filter {
    /// Short name used in download filenames and status messages
    pub fn label(&self) -> &'static str {
        match self {
            Filter::Grayscale => "grayscale",
            Filter::Blur { .. } => "blur",
        }
    }

    /// Apply this filter to a bitmap on the calling thread
    pub fn apply(&self, bitmap: &Bitmap, encoding: Encoding) -> Result<EncodedImage> {
        match *self {
            Filter::Grayscale => to_grayscale(bitmap, encoding),
            Filter::Blur { radius } => apply_blur(bitmap, radius, encoding),
        }
    }
}

/// Apply a filter on tokio's blocking pool
///
/// Filters are CPU-bound, so they must not run on the UI executor.
pub async fn apply_filter(
    bitmap: Bitmap,
    filter: Filter,
    encoding: Encoding,
) -> Result<EncodedImage> {
    tokio::task::spawn_blocking(move || filter.apply(&bitmap, encoding))
        .await
        .map_err(|e| TransformError::Worker(format!("Task join error: {}", e)))?
}
