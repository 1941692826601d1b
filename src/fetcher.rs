//! Page Fetcher
//!
//! GET with header rotation, request pacing and bounded retries:
//!
//! 1. Every attempt after the first waits a random jitter on top of the
//!    backoff chosen by the previous failure.
//! 2. Every attempt passes through the fetcher's [`Throttle`].
//! 3. 403/404 are definitive: no retry.
//! 4. 429 honors `Retry-After`, else backs off by an attempt-scaled step.
//! 5. Anything else (network error, other non-2xx) backs off linearly.
//!
//! Exhausting the attempt ceiling yields [`ScrapeError::FetchFailure`].

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use crate::config::FetchPolicy;
use crate::error::{Result, ScrapeError};
use crate::fingerprint::random_profile;
use crate::http_client::{HttpClient, Transport};
use crate::throttle::Throttle;

/// A successfully retrieved page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL that was requested.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    pub body: String,
    /// Attempts it took, including the successful one.
    pub attempts: u32,
}

impl FetchedPage {
    pub fn was_redirected(&self) -> bool {
        self.final_url != self.url
    }
}

/// Retrying, throttled page fetcher
pub struct PageFetcher {
    transport: Arc<dyn Transport>,
    policy: FetchPolicy,
    throttle: Throttle,
}

impl PageFetcher {
    pub fn new(transport: Arc<dyn Transport>, policy: FetchPolicy) -> Self {
        let throttle = Throttle::new(policy.min_interval());
        Self {
            transport,
            policy,
            throttle,
        }
    }

    /// Fetcher over a real reqwest client.
    pub fn with_http_client(policy: FetchPolicy) -> Result<Self> {
        let client = HttpClient::new(&policy)?;
        Ok(Self::new(Arc::new(client), policy))
    }

    /// Fetch a page with the default rotated headers.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.fetch_with_headers(url, None).await
    }

    /// Fetch a page; `extra` headers override the rotated defaults.
    #[instrument(skip(self, extra), fields(url = %url))]
    pub async fn fetch_with_headers(
        &self,
        url: &str,
        extra: Option<&HeaderMap>,
    ) -> Result<FetchedPage> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut backoff = Duration::ZERO;
        let mut last_status: Option<StatusCode> = None;
        let mut last_message = String::new();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let delay = backoff + self.jitter();
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying");
                tokio::time::sleep(delay).await;
            }

            self.throttle.wait().await;

            let mut headers = random_profile().to_headers();
            if let Some(extra) = extra {
                for (name, value) in extra {
                    headers.insert(name.clone(), value.clone());
                }
            }

            match self.transport.get(url, headers).await {
                Ok(response) if response.status.is_success() => {
                    debug!(attempt, status = %response.status, "Fetched");
                    return Ok(FetchedPage {
                        url: url.to_string(),
                        final_url: response.final_url,
                        status: response.status.as_u16(),
                        body: response.body,
                        attempts: attempt,
                    });
                }
                Ok(response) => {
                    let status = response.status;
                    last_status = Some(status);
                    last_message = format!("HTTP {status}");

                    if is_definitive(status) {
                        warn!(attempt, status = %status, "Not retrying");
                        return Err(failure(url, attempt, Some(status), last_message));
                    }

                    backoff = if status == StatusCode::TOO_MANY_REQUESTS {
                        response
                            .retry_after
                            .unwrap_or_else(|| self.policy.rate_limit_backoff(attempt))
                    } else {
                        self.policy.backoff(attempt)
                    };
                    warn!(attempt, status = %status, "Request failed");
                }
                Err(e) => {
                    last_status = None;
                    last_message = e.to_string();
                    backoff = self.policy.backoff(attempt);
                    warn!(attempt, error = %e, "Request error");
                }
            }
        }

        Err(failure(url, max_attempts, last_status, last_message))
    }

    fn jitter(&self) -> Duration {
        let min = self.policy.jitter_min_ms;
        let max = self.policy.jitter_max_ms;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// 403 and 404 mean "blocked" or "gone": retrying won't change that.
fn is_definitive(status: StatusCode) -> bool {
    matches!(status, StatusCode::FORBIDDEN | StatusCode::NOT_FOUND)
}

fn failure(url: &str, attempts: u32, status: Option<StatusCode>, message: String) -> ScrapeError {
    ScrapeError::FetchFailure {
        url: url.to_string(),
        attempts,
        status: status.map(|s| s.as_u16()),
        message,
    }
}
