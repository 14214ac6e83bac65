//! HTTP client for batch page fetching
//!
//! Issues GET/HEAD requests with a fixed user agent and a per-request
//! timeout. Transport failures never surface as errors: they come back as an
//! `HttpResponse` with status code 0 so a fetch loop can keep going.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, ClientBuilder, Method};
use tracing::{debug, info, warn};

use crate::domain::response::HttpResponse;

/// User agent attached to every request
pub const DEFAULT_USER_AGENT: &str = "webbot/0.1 (Batch Fetch; +https://crates.io/crates/webbot)";

/// Timeouts below this are treated as "unset"
pub const MIN_TIMEOUT_SECONDS: f64 = 0.1;

/// Timeout used when the caller passes an unset (near-zero or negative) value
pub const FALLBACK_TIMEOUT_SECONDS: f64 = 60.0;

const MAX_REDIRECTS: usize = 10;

static STATUS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^HTTP\S*\s+(\d{3})(?:\s|$)").expect("status line pattern is valid"));

const CONTENT_TYPE_PREFIX: &str = "content-type:";

/// Configuration for HTTP client behavior
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            follow_redirects: true,
        }
    }
}

/// Seconds actually used for a request given the caller's value
pub fn effective_timeout(timeout_seconds: f64) -> f64 {
    if timeout_seconds.is_nan() || timeout_seconds < MIN_TIMEOUT_SECONDS {
        FALLBACK_TIMEOUT_SECONDS
    } else {
        timeout_seconds
    }
}

/// Status code and content type scanned out of raw header lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHeaders {
    /// `0` when no status line was found
    pub status_code: u16,
    /// The first `Content-Type:` line, verbatim
    pub content_type: Option<String>,
}

/// Scan raw header lines.
///
/// The first `HTTP<version> <code> <reason>` line supplies the status code and
/// the first line starting with `Content-Type:` (any case) supplies the
/// content type. Later matches are ignored.
pub fn parse_header_lines<S: AsRef<str>>(lines: &[S]) -> ParsedHeaders {
    let mut parsed = ParsedHeaders::default();
    let mut status_found = false;

    for line in lines {
        let line = line.as_ref();

        if !status_found {
            if let Some(code) = STATUS_LINE
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|code| code.as_str().parse::<u16>().ok())
            {
                parsed.status_code = code;
                status_found = true;
                continue;
            }
        }

        if parsed.content_type.is_none()
            && line
                .get(..CONTENT_TYPE_PREFIX.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(CONTENT_TYPE_PREFIX))
        {
            parsed.content_type = Some(line.to_string());
        }

        if status_found && parsed.content_type.is_some() {
            break;
        }
    }

    parsed
}

/// Something that can fetch a page.
///
/// Implementations must not fail: transport problems are reported through
/// the returned response.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str, timeout_seconds: f64) -> HttpResponse;

    async fn head(&self, url: &str, timeout_seconds: f64) -> HttpResponse;
}

/// reqwest-backed fetcher
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(&config.user_agent)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(MAX_REDIRECTS)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub async fn get(&self, url: &str, timeout_seconds: f64) -> HttpResponse {
        self.request(Method::GET, url, timeout_seconds).await
    }

    /// HEAD request. The body of the result is always empty.
    pub async fn head(&self, url: &str, timeout_seconds: f64) -> HttpResponse {
        self.request(Method::HEAD, url, timeout_seconds).await
    }

    async fn request(&self, method: Method, url: &str, timeout_seconds: f64) -> HttpResponse {
        let timeout = effective_timeout(timeout_seconds);
        info!("🌐 HTTP {} {} (timeout {}s)", method, url, timeout);

        let response = match self
            .client
            .request(method.clone(), url)
            .timeout(Duration::try_from_secs_f64(timeout).unwrap_or(Duration::MAX))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("❌ HTTP {} failed for {}: {}", method, url, e);
                return HttpResponse::failed(url, e.to_string());
            }
        };

        // Render the response head as raw lines so parsing goes through one path
        let mut raw_headers = Vec::with_capacity(response.headers().len() + 1);
        raw_headers.push(format!("{:?} {}", response.version(), response.status()));
        raw_headers.extend(response.headers().iter().map(|(name, value)| {
            format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()))
        }));

        let body = if method == Method::HEAD {
            Vec::new()
        } else {
            match response.bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(e) => {
                    warn!("❌ Failed to read response body from {}: {}", url, e);
                    return HttpResponse::failed(url, e.to_string());
                }
            }
        };

        let parsed = parse_header_lines(&raw_headers);
        debug!(
            "Parsed response head for {}: status={} content_type={:?}",
            url, parsed.status_code, parsed.content_type
        );

        HttpResponse::new(
            parsed.status_code,
            parsed.content_type.as_deref().unwrap_or_default(),
            body,
            raw_headers,
            url,
        )
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn get(&self, url: &str, timeout_seconds: f64) -> HttpResponse {
        HttpClient::get(self, url, timeout_seconds).await
    }

    async fn head(&self, url: &str, timeout_seconds: f64) -> HttpResponse {
        HttpClient::head(self, url, timeout_seconds).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 60.0)]
    #[case(-5.0, 60.0)]
    #[case(0.09, 60.0)]
    #[case(f64::NAN, 60.0)]
    #[case(0.1, 0.1)]
    #[case(2.5, 2.5)]
    #[case(30.0, 30.0)]
    fn test_effective_timeout(#[case] input: f64, #[case] expected: f64) {
        assert_eq!(effective_timeout(input), expected);
    }

    proptest! {
        #[test]
        fn prop_small_timeouts_use_fallback(t in -1.0e6f64..0.1) {
            prop_assert_eq!(effective_timeout(t), FALLBACK_TIMEOUT_SECONDS);
        }

        #[test]
        fn prop_large_timeouts_pass_through(t in 0.1f64..1.0e6) {
            prop_assert_eq!(effective_timeout(t), t);
        }
    }

    #[test]
    fn test_parse_status_and_content_type() {
        let lines = [
            "HTTP/1.1 200 OK",
            "Date: Sat, 17 Oct 2026 10:00:00 GMT",
            "Content-Type: text/html; charset=UTF-8",
        ];
        let parsed = parse_header_lines(&lines);
        assert_eq!(parsed.status_code, 200);
        assert_eq!(
            parsed.content_type.as_deref(),
            Some("Content-Type: text/html; charset=UTF-8")
        );
    }

    #[test]
    fn test_first_status_line_wins() {
        let lines = [
            "HTTP/1.1 301 Moved Permanently",
            "location: /next",
            "HTTP/1.1 200 OK",
            "content-type: text/plain",
            "CONTENT-TYPE: application/json",
        ];
        let parsed = parse_header_lines(&lines);
        assert_eq!(parsed.status_code, 301);
        assert_eq!(parsed.content_type.as_deref(), Some("content-type: text/plain"));
    }

    #[rstest]
    #[case(&["HTTP/2 404"], 404)]
    #[case(&["HTTP/1.0 503 Service Unavailable"], 503)]
    #[case(&["HTTP 200 OK"], 200)]
    #[case(&["HTTP/1.1"], 0)]
    #[case(&["HTTP/1.1 20 OK"], 0)]
    #[case(&["X-HTTP/1.1 200 OK"], 0)]
    #[case(&[], 0)]
    fn test_status_line_variants(#[case] lines: &[&str], #[case] expected: u16) {
        assert_eq!(parse_header_lines(lines).status_code, expected);
    }

    #[test]
    fn test_missing_content_type() {
        let parsed = parse_header_lines(&["HTTP/1.1 204 No Content", "content-length: 0"]);
        assert_eq!(parsed.status_code, 204);
        assert_eq!(parsed.content_type, None);
    }

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = HttpClientConfig {
            user_agent: "Test Agent".to_string(),
            follow_redirects: false,
        };

        let client = HttpClient::with_config(config).unwrap();
        assert_eq!(client.config().user_agent, "Test Agent");
        assert!(!client.config().follow_redirects);
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_failed_response() {
        let client = HttpClient::new().unwrap();
        // Port 9 (discard) on localhost is not expected to accept connections
        let response = client.get("http://127.0.0.1:9/", 2.0).await;
        assert_eq!(response.status_code(), 0);
        assert!(!response.success());
        assert!(response.body().is_empty());
        assert_eq!(response.url(), "http://127.0.0.1:9/");
    }

    #[tokio::test]
    async fn test_malformed_url_yields_failed_response() {
        let client = HttpClient::new().unwrap();
        let response = client.get("http://", 1.0).await;
        assert_eq!(response.status_code(), 0);
        assert!(response.failure_reason().is_some());
    }
}
