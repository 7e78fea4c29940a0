//! Application configuration
//!
//! Settings are read once at startup from
//! - Linux: ~/.config/photo-gallery/config.json
//! - macOS: ~/Library/Application Support/photo-gallery/config.json
//! - Windows: %APPDATA%\photo-gallery\config.json
//!
//! The file is optional and never written. Any field left out keeps its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::transform::{Encoding, DEFAULT_BLUR_RADIUS};

/// Errors while reading the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// All tunables of the gallery
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GalleryConfig {
    /// Root of the image API
    pub api_base: String,
    /// Records requested per page
    pub page_size: u32,
    /// Grid thumbnail rendition size
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    /// Detail view rendition size (also the bitmap the filters run on)
    pub detail_width: u32,
    pub detail_height: u32,
    /// Blur radius in pixels used by the Blur button
    pub default_blur_radius: u32,
    /// JPEG quality of transform output (1-100)
    pub jpeg_quality: u8,
    /// Encode transform output as PNG instead of JPEG (keeps transparency)
    pub lossless_output: bool,
    /// How long a download's temporary file outlives the save
    pub temp_release_delay_ms: u64,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_base: "https://picsum.photos".to_string(),
            page_size: 30,
            thumbnail_width: 400,
            thumbnail_height: 300,
            detail_width: 1200,
            detail_height: 800,
            default_blur_radius: DEFAULT_BLUR_RADIUS,
            jpeg_quality: 90,
            lossless_output: false,
            temp_release_delay_ms: 100,
            request_timeout_secs: 30,
        }
    }
}

impl GalleryConfig {
    /// Load the config from the user's config directory, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                info!("⚙️  Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Read and sanitize a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and sanitize config JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Get the path where the config file is expected
    fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("photo-gallery");
        path.push("config.json");
        Some(path)
    }

    /// Clamp out-of-range values instead of rejecting the whole file
    fn sanitized(mut self) -> Self {
        if self.page_size == 0 {
            warn!("page_size must be positive, using 30");
            self.page_size = 30;
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            let clamped = self.jpeg_quality.clamp(1, 100);
            warn!("jpeg_quality {} out of range, using {}", self.jpeg_quality, clamped);
            self.jpeg_quality = clamped;
        }
        if self.thumbnail_width == 0 || self.thumbnail_height == 0 {
            warn!("thumbnail size must be positive, using 400x300");
            self.thumbnail_width = 400;
            self.thumbnail_height = 300;
        }
        if self.detail_width == 0 || self.detail_height == 0 {
            warn!("detail size must be positive, using 1200x800");
            self.detail_width = 1200;
            self.detail_height = 800;
        }
        if self.api_base.trim().is_empty() {
            self.api_base = Self::default().api_base;
        }
        self
    }

    /// Encoding used for transform output
    pub fn encoding(&self) -> Encoding {
        if self.lossless_output {
            Encoding::Png
        } else {
            Encoding::Jpeg {
                quality: self.jpeg_quality,
            }
        }
    }

    /// Where the save dialog opens by default
    pub fn download_dir(&self) -> Option<PathBuf> {
        dirs::download_dir().or_else(dirs::home_dir)
    }
}
