//! Infinite-scroll pagination loader
//!
//! Owns the records shown in the grid plus the page cursor and the
//! loading / exhausted / error flags. The record list only ever grows:
//! pages are appended in arrival order and never reordered or removed.
//!
//! The UI drives the loader in two halves so a fetch can run as an iced
//! task: `next_request` admits a fetch and returns a `PageRequest`,
//! `finish_load` applies the outcome. `load_next_page` does both for
//! callers that can await directly.

use tracing::{debug, info, warn};

use super::data::ImageRecord;
use crate::api::{ApiError, CachePolicy, ImageSource};

/// Observable state of the loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderState<'a> {
    /// Waiting for a trigger, more pages may exist
    Idle,
    /// A page fetch is in flight
    Loading,
    /// The API returned an empty page, nothing more will be fetched
    Exhausted,
    /// The last fetch failed; `retry` re-issues it
    Error(&'a str),
}

/// One admitted page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// List pages always revalidate so a refreshed grid sees new images
    pub async fn fetch<S: ImageSource>(self, source: &S) -> Result<Vec<ImageRecord>, ApiError> {
        source
            .list_page(self.page, self.limit, CachePolicy::AlwaysRevalidate)
            .await
    }
}

/// Pagination state for one grid view
#[derive(Debug, Clone)]
pub struct PageLoader {
    records: Vec<ImageRecord>,
    /// Next page to request (starts at 1)
    cursor: u32,
    page_size: u32,
    is_loading: bool,
    has_more: bool,
    error: Option<String>,
}

impl PageLoader {
    /// Create an empty loader that will start at page 1
    pub fn new(page_size: u32) -> Self {
        Self {
            records: Vec::new(),
            cursor: 1,
            page_size: page_size.max(1),
            is_loading: false,
            has_more: true,
            error: None,
        }
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The next page number that will be requested
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> LoaderState<'_> {
        if self.is_loading() {
            LoaderState::Loading
        } else if let Some(message) = self.error() {
            LoaderState::Error(message)
        } else if !self.has_more() {
            LoaderState::Exhausted
        } else {
            LoaderState::Idle
        }
    }

    /// Admit a page fetch
    ///
    /// Returns the page to request, or `None` if a fetch is already in
    /// flight, the list is exhausted, or the last attempt failed (only
    /// `retry` leaves the error state). Overlapping triggers are dropped,
    /// not queued.
    pub fn begin_load(&mut self) -> Option<u32> {
        if !self.has_more {
            debug!("Load ignored: no more pages");
            return None;
        }
        if self.is_loading {
            debug!("Load ignored: page {} already in flight", self.cursor);
            return None;
        }
        if self.error.is_some() {
            debug!("Load ignored: page {} failed, waiting for retry", self.cursor);
            return None;
        }

        self.is_loading = true;
        debug!("Loading page {}", self.cursor);
        Some(self.cursor)
    }

    /// Manual retry after a failure. Targets the same page as the failed attempt.
    pub fn retry(&mut self) -> Option<u32> {
        if self.error.take().is_some() {
            info!("🔁 Retrying page {}", self.cursor);
        }
        self.begin_load()
    }

    /// Admit a fetch and describe it. With `retry` the last error is cleared first.
    pub fn next_request(&mut self, retry: bool) -> Option<PageRequest> {
        let page = if retry { self.retry() } else { self.begin_load() }?;
        Some(PageRequest {
            page,
            limit: self.page_size,
        })
    }

    /// Apply the outcome of the fetch admitted by `begin_load`
    pub fn finish_load(&mut self, page: u32, result: Result<Vec<ImageRecord>, ApiError>) {
        if !self.is_loading || page != self.cursor {
            warn!(
                "Ignoring result for page {} (in flight: {}, cursor: {})",
                page, self.is_loading, self.cursor
            );
            return;
        }
        self.is_loading = false;

        match result {
            Ok(records) => self.apply_page(page, records),
            Err(e) => {
                warn!("⚠️  Page {} failed: {}", page, e);
                self.error = Some(e.to_string());
            }
        }
    }

    /// Fetch the next page from `source` if one may be fetched
    ///
    /// Returns `true` if a request was issued.
    pub async fn load_next_page<S: ImageSource>(&mut self, source: &S) -> bool {
        let Some(request) = self.next_request(false) else {
            return false;
        };
        let result = request.fetch(source).await;
        self.finish_load(request.page, result);
        true
    }

    fn apply_page(&mut self, page: u32, records: Vec<ImageRecord>) {
        if records.is_empty() {
            info!("📭 Page {} is empty, reached the end ({} images)", page, self.records.len());
            self.has_more = false;
            return;
        }

        debug!("Page {} added {} images", page, records.len());
        self.records.extend(records);
        self.cursor += 1;
    }
}
