//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the API layer, the transform pipeline and the UI layer.

use serde::{Deserialize, Serialize};

/// Represents a single image record returned by the image API
///
/// Records are immutable once fetched: the loader only ever appends them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Opaque, stable identifier (e.g., "237")
    pub id: String,
    /// Photographer name
    pub author: String,
    /// Original width in pixels
    pub width: u32,
    /// Original height in pixels
    pub height: u32,
    /// Attribution link (the photo's page on its original site)
    #[serde(rename = "url")]
    pub source_url: String,
    /// Full-resolution download link
    pub download_url: String,
}

impl ImageRecord {
    /// Both dimensions must be positive for a record to be usable
    pub fn has_valid_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Output format of an encoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// File extension used for downloads
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

/// An in-memory encoded image payload produced by a transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

/// Something the detail view can display or download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplaySource {
    /// A remote image, fetched on demand
    Remote(String),
    /// An already-encoded payload held in memory
    Encoded(EncodedImage),
}
