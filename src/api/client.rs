//! HTTP client for the Lorem Picsum image API.
//!
//! Endpoints:
//! - `GET {base}/v2/list?page=&limit=` returns a JSON array of records
//! - `GET {base}/id/{id}/info` returns one record
//! - `GET {base}/id/{id}/{width}/{height}` returns resized image bytes

use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use super::error::{ApiError, Result};
use super::{CachePolicy, ImageSource};
use crate::config::GalleryConfig;
use crate::state::data::ImageRecord;

/// User agent sent with every request.
const CLIENT_NAME: &str = "photo-gallery";

/// Client for the image API.
#[derive(Debug, Clone)]
pub struct PicsumClient {
    /// HTTP client (cheap to clone, shares its connection pool).
    http: Client,
    /// API root without trailing slash, e.g. `https://picsum.photos`.
    base_url: String,
}

impl PicsumClient {
    /// Create a client from the application config.
    pub fn new(config: &GalleryConfig) -> Result<Self> {
        Self::with_base_url(
            &config.api_base,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Create a client against an arbitrary API root.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn list_url(&self) -> String {
        format!("{}/v2/list", self.base_url)
    }

    fn info_url(&self, id: &str) -> String {
        format!("{}/id/{}/info", self.base_url, id)
    }

    fn request(&self, url: &str, cache: CachePolicy) -> RequestBuilder {
        self.http
            .get(url)
            .header(USER_AGENT, format!("{}/{}", CLIENT_NAME, env!("CARGO_PKG_VERSION")))
            .header(CACHE_CONTROL, cache.header_value())
    }
}

impl ImageSource for PicsumClient {
    async fn list_page(
        &self,
        page: u32,
        limit: u32,
        cache: CachePolicy,
    ) -> Result<Vec<ImageRecord>> {
        let page = page.max(1);
        let limit = limit.max(1);
        debug!("Fetching page {} (limit {})", page, limit);

        let response = self
            .request(&self.list_url(), cache)
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        check_list_status(status, &body)?;

        let records = parse_records(&body)?;
        debug!("Page {} returned {} records", page, records.len());
        Ok(records)
    }

    async fn fetch_by_id(&self, id: &str, cache: CachePolicy) -> Result<ImageRecord> {
        debug!("Fetching record {}", id);

        let response = self.request(&self.info_url(id), cache).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        check_record_status(status, id, &body)?;

        parse_record(&body)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Fetching image bytes from {}", url);

        let response = self.request(url, CachePolicy::PreferCached).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = status.canonical_reason().unwrap_or("Unknown error").to_string();
            warn!("Image fetch failed with {}: {}", status.as_u16(), url);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    fn build_resized_url(&self, id: &str, width: u32, height: u32) -> String {
        resized_url(&self.base_url, id, width, height)
    }
}

/// `{base}/id/{id}/{width}/{height}`, no validation of the id.
pub fn resized_url(base_url: &str, id: &str, width: u32, height: u32) -> String {
    format!("{}/id/{}/{}/{}", base_url.trim_end_matches('/'), id, width, height)
}

/// The list endpoint has no not-found case: every non-2xx is a server error.
fn check_list_status(status: u16, body: &str) -> Result<()> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    Err(ApiError::Server {
        status,
        message: error_message(body),
    })
}

/// The single-record endpoint answers 404 for unknown ids and 400 for
/// malformed ones; both mean the record does not exist.
fn check_record_status(status: u16, id: &str, body: &str) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        400 | 404 => Err(ApiError::NotFound(id.to_string())),
        _ => Err(ApiError::Server {
            status,
            message: error_message(body),
        }),
    }
}

fn error_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Unknown error".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

fn parse_records(body: &str) -> Result<Vec<ImageRecord>> {
    let records: Vec<ImageRecord> = serde_json::from_str(body)?;
    if let Some(bad) = records.iter().find(|r| !r.has_valid_dimensions()) {
        return Err(ApiError::Parse(format!(
            "record {} has invalid dimensions {}x{}",
            bad.id, bad.width, bad.height
        )));
    }
    Ok(records)
}

fn parse_record(body: &str) -> Result<ImageRecord> {
    let record: ImageRecord = serde_json::from_str(body)?;
    if !record.has_valid_dimensions() {
        return Err(ApiError::Parse(format!(
            "record {} has invalid dimensions {}x{}",
            record.id, record.width, record.height
        )));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"[
        {"id":"0","author":"Alejandro Escamilla","width":5000,"height":3333,
         "url":"https://unsplash.com/photos/yC-Yzbqy7PY","download_url":"https://picsum.photos/id/0/5000/3333"},
        {"id":"1","author":"Alejandro Escamilla","width":5000,"height":3333,
         "url":"https://unsplash.com/photos/LNRyGwIJr5c","download_url":"https://picsum.photos/id/1/5000/3333"}
    ]"#;

    #[test]
    fn test_resized_url_template() {
        assert_eq!(
            resized_url("https://picsum.photos", "237", 400, 300),
            "https://picsum.photos/id/237/400/300"
        );
        // Trailing slash on the base is tolerated, unknown ids are not checked
        assert_eq!(
            resized_url("https://picsum.photos/", "nope", 1, 2),
            "https://picsum.photos/id/nope/1/2"
        );
    }

    #[test]
    fn test_client_urls() {
        let client =
            PicsumClient::with_base_url("https://example.test/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://example.test");
        assert_eq!(client.list_url(), "https://example.test/v2/list");
        assert_eq!(client.info_url("237"), "https://example.test/id/237/info");
        assert_eq!(
            client.build_resized_url("10", 1200, 800),
            "https://example.test/id/10/1200/800"
        );
    }

    #[test]
    fn test_parse_page_preserves_order() {
        let records = parse_records(PAGE).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["0", "1"]);
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_zero_dimensions() {
        let body = r#"[{"id":"9","author":"x","width":0,"height":10,"url":"u","download_url":"d"}]"#;
        assert!(matches!(parse_records(body), Err(ApiError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(parse_record("<html>"), Err(ApiError::Parse(_))));
    }

    #[test]
    fn test_record_status_not_found() {
        assert_eq!(
            check_record_status(404, "does-not-exist", ""),
            Err(ApiError::NotFound("does-not-exist".to_string()))
        );
        assert!(check_record_status(400, "x", "Invalid image id")
            .unwrap_err()
            .is_not_found());
        assert!(check_record_status(200, "237", "").is_ok());
    }

    #[test]
    fn test_record_status_server_error() {
        let err = check_record_status(502, "237", "Bad Gateway").unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 502,
                message: "Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn test_list_status_never_not_found() {
        let err = check_list_status(404, "").unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(
            err,
            ApiError::Server {
                status: 404,
                message: "Unknown error".to_string()
            }
        );
    }

    /// Answer one connection with a canned response; the handle yields the raw request
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (PicsumClient, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_lowercase()
        });

        let client = PicsumClient::with_base_url(&base, Duration::from_secs(5)).unwrap();
        (client, server)
    }

    const RECORD_237: &str = r#"{"id":"237","author":"André Spieker","width":3500,"height":2095,
        "url":"https://unsplash.com/photos/8wTPqxlnKM4","download_url":"https://picsum.photos/id/237/3500/2095"}"#;

    #[tokio::test]
    async fn test_list_page_sends_query_and_cache_header() {
        let (client, server) = serve_once("200 OK", PAGE).await;

        let records = client
            .list_page(3, 5, CachePolicy::AlwaysRevalidate)
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("get /v2/list?page=3&limit=5 http/1.1"));
        assert!(request.contains("cache-control: no-cache"));
        assert!(request.contains("user-agent: photo-gallery/"));
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["0", "1"]);
    }

    #[tokio::test]
    async fn test_list_page_empty_array_is_empty_page() {
        let (client, server) = serve_once("200 OK", "[]").await;

        let records = client
            .list_page(99, 30, CachePolicy::AlwaysRevalidate)
            .await
            .unwrap();

        server.await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_list_page_server_error() {
        let (client, server) = serve_once("500 Internal Server Error", "boom").await;

        let err = client
            .list_page(1, 30, CachePolicy::AlwaysRevalidate)
            .await
            .unwrap_err();

        server.await.unwrap();
        assert_eq!(
            err,
            ApiError::Server {
                status: 500,
                message: "boom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_by_id_returns_record() {
        let (client, server) = serve_once("200 OK", RECORD_237).await;

        let record = client
            .fetch_by_id("237", CachePolicy::PreferCached)
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("get /id/237/info http/1.1"));
        assert!(request.contains("cache-control: max-stale"));
        assert_eq!(record.id, "237");
        assert_eq!(record.author, "André Spieker");
        assert_eq!(record.download_url, "https://picsum.photos/id/237/3500/2095");
    }

    #[tokio::test]
    async fn test_fetch_by_id_unknown_is_not_found() {
        let (client, server) = serve_once("404 Not Found", "Image does not exist").await;

        let err = client
            .fetch_by_id("does-not-exist", CachePolicy::PreferCached)
            .await
            .unwrap_err();

        server.await.unwrap();
        assert!(err.is_not_found());
        assert_eq!(err, ApiError::NotFound("does-not-exist".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_by_id_server_error_is_not_not_found() {
        let (client, server) = serve_once("503 Service Unavailable", "").await;

        let err = client
            .fetch_by_id("237", CachePolicy::PreferCached)
            .await
            .unwrap_err();

        server.await.unwrap();
        assert!(!err.is_not_found());
        assert!(matches!(err, ApiError::Server { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_bytes_returns_body() {
        let (client, server) = serve_once("200 OK", "jpegbytes").await;
        let url = client.build_resized_url("237", 400, 300);

        let bytes = client.fetch_bytes(&url).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("get /id/237/400/300 http/1.1"));
        assert_eq!(bytes, b"jpegbytes");
    }

    #[tokio::test]
    async fn test_fetch_bytes_missing_image_is_server_error() {
        let (client, server) = serve_once("404 Not Found", "").await;

        let err = client.fetch_bytes(&client.build_resized_url("x", 1, 1)).await.unwrap_err();

        server.await.unwrap();
        assert!(matches!(err, ApiError::Server { status: 404, .. }));
    }
}
