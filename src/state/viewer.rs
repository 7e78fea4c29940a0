//! Detail view state for a single image
//!
//! Holds the immutable original source, the currently displayed source,
//! the decoded bitmap the filters read from, and the last error.
//! A failed transform never replaces what is on screen.

use tracing::{info, warn};

use super::data::{DisplaySource, EncodedImage, ImageRecord};
use crate::transform::{Bitmap, Filter, TransformError};

#[derive(Debug, Clone)]
pub struct Viewer {
    record: ImageRecord,
    original: DisplaySource,
    current: DisplaySource,
    bitmap: Option<Bitmap>,
    filter: Option<Filter>,
    busy: bool,
    error: Option<String>,
}

impl Viewer {
    /// `display_url` is the rendition shown before any filter is applied
    pub fn new(record: ImageRecord, display_url: String) -> Self {
        let original = DisplaySource::Remote(display_url);
        Self {
            record,
            current: original.clone(),
            original,
            bitmap: None,
            filter: None,
            busy: false,
            error: None,
        }
    }

    pub fn record(&self) -> &ImageRecord {
        &self.record
    }

    pub fn current(&self) -> &DisplaySource {
        &self.current
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }

    pub fn active_filter(&self) -> Option<Filter> {
        self.filter
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.current != self.original
    }

    /// The original rendition was fetched and decoded
    pub fn set_bitmap(&mut self, bitmap: Bitmap) {
        self.bitmap = Some(bitmap);
        self.error = None;
    }

    /// Fetching or decoding the original rendition failed
    pub fn set_load_error(&mut self, message: String) {
        warn!("⚠️  Could not load image {}: {}", self.record.id, message);
        self.error = Some(message);
    }

    /// Mark a transform as started. Returns `None` when one is already
    /// running or there is no bitmap to read from.
    pub fn begin_transform(&mut self) -> Option<Bitmap> {
        if self.busy {
            return None;
        }
        let Some(bitmap) = self.bitmap.clone() else {
            self.error = Some("Image is still loading".to_string());
            return None;
        };
        self.busy = true;
        self.error = None;
        Some(bitmap)
    }

    /// Apply the outcome of a transform
    pub fn apply(&mut self, filter: Filter, result: Result<EncodedImage, TransformError>) {
        self.busy = false;
        match result {
            Ok(encoded) => {
                info!(
                    "🎨 Applied {} to image {} ({} KB)",
                    filter.label(),
                    self.record.id,
                    encoded.bytes.len() / 1024
                );
                self.current = DisplaySource::Encoded(encoded);
                self.filter = Some(filter);
                self.error = None;
            }
            Err(e) => {
                warn!("⚠️  {} failed on image {}: {}", filter.label(), self.record.id, e);
                self.error = Some(e.to_string());
            }
        }
    }

    /// Go back to the original rendition
    pub fn revert(&mut self) {
        self.current = self.original.clone();
        self.filter = None;
        self.error = None;
    }

    /// Source to save: the filtered payload if any, otherwise the full-resolution original
    pub fn download_source(&self) -> DisplaySource {
        match &self.current {
            DisplaySource::Encoded(_) => self.current.clone(),
            DisplaySource::Remote(_) => DisplaySource::Remote(self.record.download_url.clone()),
        }
    }

    /// Default filename offered by the save dialog
    pub fn suggested_filename(&self) -> String {
        match (&self.current, self.filter) {
            (DisplaySource::Encoded(encoded), Some(filter)) => format!(
                "photo-{}-{}.{}",
                self.record.id,
                filter.label(),
                encoded.format.extension()
            ),
            // Remote originals are served as JPEG
            _ => format!("photo-{}.jpg", self.record.id),
        }
    }
}
