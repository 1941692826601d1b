//! Scrape error taxonomy.
//!
//! Extraction misses are not errors: a page without a recognizable count
//! degrades to `viewers: 0`. Only URL classification and page fetching fail.

use thiserror::Error;

/// Errors raised by the scrape pipeline
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Input is not a recognizable YouTube video or channel URL.
    /// Raised before any request goes out.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Page could not be retrieved after retries, or a non-retryable
    /// status (403/404) came back.
    #[error("Failed to fetch {url} after {attempts} attempt(s): {message}")]
    FetchFailure {
        url: String,
        attempts: u32,
        status: Option<u16>,
        message: String,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl ScrapeError {
    /// Last HTTP status seen before giving up, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::FetchFailure { status, .. } => *status,
            Self::Client(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidUrl(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
