/// Image API module
///
/// This module handles:
/// - The `ImageSource` port the loader, viewer and downloader depend on
/// - The HTTP client for the Lorem Picsum API (client.rs)
/// - API error taxonomy (error.rs)

pub mod client;
pub mod error;

use std::future::Future;

use crate::state::data::ImageRecord;

pub use client::PicsumClient;
pub use error::{ApiError, Result};

/// Per-request caching hint passed down to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Always revalidate with the server (list pages, so scrolling sees fresh content)
    AlwaysRevalidate,
    /// Accept a cached response (single records that were already fetched)
    PreferCached,
}

impl CachePolicy {
    /// Value for the `Cache-Control` request header
    pub fn header_value(&self) -> &'static str {
        match self {
            CachePolicy::AlwaysRevalidate => "no-cache",
            CachePolicy::PreferCached => "max-stale",
        }
    }
}

/// Source of image records and image bytes
///
/// Implemented over HTTP by [`PicsumClient`]; tests swap in in-memory fakes.
pub trait ImageSource: Send + Sync {
    /// Fetch one page of records. An empty page means there is no more data.
    fn list_page(
        &self,
        page: u32,
        limit: u32,
        cache: CachePolicy,
    ) -> impl Future<Output = Result<Vec<ImageRecord>>> + Send;

    /// Fetch a single record. Fails with [`ApiError::NotFound`] for unknown ids.
    fn fetch_by_id(
        &self,
        id: &str,
        cache: CachePolicy,
    ) -> impl Future<Output = Result<ImageRecord>> + Send;

    /// Fetch the raw bytes behind an image URL
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Build the URL of a resized rendition. Pure string templating.
    fn build_resized_url(&self, id: &str, width: u32, height: u32) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_header_values() {
        assert_eq!(CachePolicy::AlwaysRevalidate.header_value(), "no-cache");
        assert_eq!(CachePolicy::PreferCached.header_value(), "max-stale");
    }
}
