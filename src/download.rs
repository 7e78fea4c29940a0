//! Saving images to disk.
//!
//! Encoded payloads are written straight to the destination. Remote images
//! are fetched into a temporary file first, copied to the destination, and
//! the temporary file is released shortly afterwards on a background task.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::{ApiError, ImageSource};
use crate::state::data::DisplaySource;

/// Errors that can occur while saving an image.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Fetching the remote image failed.
    #[error("download failed: {0}")]
    Fetch(#[from] ApiError),

    /// Writing the temporary or destination file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;

/// Outcome of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub bytes_written: u64,
    /// Temporary file used for a remote download (already scheduled for release)
    pub temp_path: Option<PathBuf>,
}

/// A temporary file that keeps the live counter honest however it is dropped
struct TempObject {
    file: NamedTempFile,
    live: Arc<AtomicUsize>,
}

impl Drop for TempObject {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        debug!("Released temporary file {}", self.file.path().display());
    }
}

/// Saves display sources to files
#[derive(Debug, Clone)]
pub struct Downloader<S> {
    source: S,
    release_delay: Duration,
    created: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

impl<S: ImageSource> Downloader<S> {
    pub fn new(source: S, release_delay: Duration) -> Self {
        Self {
            source,
            release_delay,
            created: Arc::new(AtomicUsize::new(0)),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Temporary files created so far
    pub fn temp_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Temporary files not yet released
    pub fn temp_live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Save `source` to `destination`
    pub async fn save(&self, source: &DisplaySource, destination: &Path) -> Result<SavedFile> {
        match source {
            DisplaySource::Encoded(encoded) => {
                tokio::fs::write(destination, &encoded.bytes).await?;
                info!(
                    "💾 Saved {} KB to {}",
                    encoded.bytes.len() / 1024,
                    destination.display()
                );
                Ok(SavedFile {
                    path: destination.to_path_buf(),
                    bytes_written: encoded.bytes.len() as u64,
                    temp_path: None,
                })
            }
            DisplaySource::Remote(url) => {
                let bytes = self.source.fetch_bytes(url).await?;
                let temp = self.materialize(&bytes)?;
                let temp_path = temp.file.path().to_path_buf();

                let copied = tokio::fs::copy(&temp_path, destination).await;
                // Release even if the copy failed
                self.schedule_release(temp);
                let bytes_written = copied?;

                info!(
                    "💾 Downloaded {} KB from {} to {}",
                    bytes_written / 1024,
                    url,
                    destination.display()
                );
                Ok(SavedFile {
                    path: destination.to_path_buf(),
                    bytes_written,
                    temp_path: Some(temp_path),
                })
            }
        }
    }

    fn materialize(&self, bytes: &[u8]) -> Result<TempObject> {
        let mut file = tempfile::Builder::new()
            .prefix("photo-gallery-")
            .suffix(".download")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        self.created.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        debug!("Created temporary file {}", file.path().display());

        Ok(TempObject {
            file,
            live: Arc::clone(&self.live),
        })
    }

    fn schedule_release(&self, temp: TempObject) {
        let delay = self.release_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            drop(temp);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{self, CachePolicy};
    use crate::state::data::{EncodedImage, ImageFormat, ImageRecord};

    const DELAY: Duration = Duration::from_millis(20);

    #[derive(Clone)]
    struct BytesSource {
        bytes: Option<Vec<u8>>,
    }

    impl ImageSource for BytesSource {
        async fn list_page(
            &self,
            _page: u32,
            _limit: u32,
            _cache: CachePolicy,
        ) -> api::Result<Vec<ImageRecord>> {
            Ok(Vec::new())
        }

        async fn fetch_by_id(&self, id: &str, _cache: CachePolicy) -> api::Result<ImageRecord> {
            Err(ApiError::NotFound(id.to_string()))
        }

        async fn fetch_bytes(&self, _url: &str) -> api::Result<Vec<u8>> {
            self.bytes
                .clone()
                .ok_or_else(|| ApiError::Transport("connection refused".to_string()))
        }

        fn build_resized_url(&self, id: &str, width: u32, height: u32) -> String {
            format!("https://picsum.test/id/{}/{}/{}", id, width, height)
        }
    }

    #[tokio::test]
    async fn test_encoded_payload_is_written_directly() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("photo-1-grayscale.jpg");
        let downloader = Downloader::new(BytesSource { bytes: None }, DELAY);
        let source = DisplaySource::Encoded(EncodedImage {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            format: ImageFormat::Jpeg,
        });

        let saved = downloader.save(&source, &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), [0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(saved.bytes_written, 4);
        assert_eq!(saved.temp_path, None);
        assert_eq!(downloader.temp_created(), 0);
    }

    #[tokio::test]
    async fn test_remote_download_uses_one_temp_file_and_releases_it() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("photo-237.jpg");
        let downloader = Downloader::new(
            BytesSource {
                bytes: Some(b"jpeg bytes".to_vec()),
            },
            DELAY,
        );
        let source = DisplaySource::Remote("https://picsum.photos/id/237/3500/2095".to_string());

        let saved = downloader.save(&source, &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"jpeg bytes");
        assert_eq!(downloader.temp_created(), 1);
        // Not released synchronously
        assert_eq!(downloader.temp_live(), 1);
        let temp_path = saved.temp_path.unwrap();
        assert!(temp_path.exists());

        tokio::time::sleep(DELAY * 5).await;

        assert_eq!(downloader.temp_live(), 0);
        assert!(!temp_path.exists());
        assert_eq!(downloader.temp_created(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_creates_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("photo-1.jpg");
        let downloader = Downloader::new(BytesSource { bytes: None }, DELAY);
        let source = DisplaySource::Remote("https://picsum.photos/id/1/10/10".to_string());

        let err = downloader.save(&source, &dest).await.unwrap_err();

        assert!(matches!(err, DownloadError::Fetch(ApiError::Transport(_))));
        assert_eq!(downloader.temp_created(), 0);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_copy_failure_still_releases_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing-dir").join("photo-1.jpg");
        let downloader = Downloader::new(
            BytesSource {
                bytes: Some(vec![1, 2, 3]),
            },
            DELAY,
        );
        let source = DisplaySource::Remote("https://picsum.photos/id/1/10/10".to_string());

        let err = downloader.save(&source, &dest).await.unwrap_err();
        assert!(matches!(err, DownloadError::Io(_)));

        tokio::time::sleep(DELAY * 5).await;
        assert_eq!(downloader.temp_created(), 1);
        assert_eq!(downloader.temp_live(), 0);
    }
}
