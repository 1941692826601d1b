//! HTTP transport
//!
//! The [`Transport`] trait is the single network seam of the crate: the
//! fetcher's retry policy, the channel resolver and the server all go
//! through it, so tests can script responses without a socket.
//!
//! [`HttpClient`] is the production implementation:
//! - TLS 1.3 via rustls
//! - Brotli, Zstd, Gzip, Deflate (auto-negotiated)
//! - DNS caching + Happy Eyeballs (hickory-dns)
//! - Cookie store, bounded redirects, hard per-request deadline

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument};

use crate::config::FetchPolicy;

/// What a single GET produced, before any retry decision.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    /// URL after following redirects.
    pub final_url: String,
    /// Parsed `Retry-After`, when the server sent one.
    pub retry_after: Option<Duration>,
    pub body: String,
}

/// One outbound GET. Network-level failures are `Err`; any HTTP status,
/// including errors, is `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<RawResponse>;
}

/// reqwest-backed transport
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with the deadlines from `policy`.
    pub fn new(policy: &FetchPolicy) -> reqwest::Result<Self> {
        let client = Client::builder()
            // Don't assume HTTP/2 - let server negotiate
            .http2_adaptive_window(true)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .zstd(true)
            .gzip(true)
            .deflate(true)
            .connect_timeout(policy.connect_timeout())
            .timeout(policy.timeout())
            // `/live` resolves through a redirect to the current broadcast
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_store(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpClient {
    #[instrument(skip(self, headers), fields(url = %url))]
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<RawResponse> {
        debug!("Sending request");
        let response = self.client.get(url).headers(headers).send().await?;

        let status = response.status();
        let final_url = response.url().to_string();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        info!(
            status = %status,
            version = ?response.version(),
            final_url = %final_url,
            "Response received"
        );

        let body = response.text().await?;
        Ok(RawResponse {
            status,
            final_url,
            retry_after,
            body,
        })
    }
}

/// Parse a `Retry-After` value: delta-seconds or an HTTP-date.
///
/// Dates in the past collapse to zero.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let when = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let delta = when.with_timezone(&chrono::Utc) - chrono::Utc::now();
    Some(delta.to_std().unwrap_or(Duration::ZERO))
}
