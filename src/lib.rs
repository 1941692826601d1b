//! `livecount` - Best-effort YouTube live viewer counter
//!
//! # Features
//!
//! - **Page fetching**: rotating browser profiles, request throttle, bounded
//!   retries with backoff and `Retry-After` support
//! - **Channel resolution**: home page, `/live`, `/videos`, then RSS feed
//! - **Field extraction**: title, live flag, viewer count, channel name, with
//!   an embedded JSON fallback
//! - **HTTP endpoint**: `POST /api/scrape` via axum
//!
//! # Example
//!
//! ```rust,no_run
//! use livecount::{Config, LiveScraper, ScrapeRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scraper = LiveScraper::from_config(&Config::default())?;
//!     let request = ScrapeRequest::new("https://www.youtube.com/@NASA", None);
//!     let result = scraper.scrape(&request).await;
//!     println!("{} viewers (live: {})", result.viewers, result.is_live);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod fingerprint;
pub mod http_client;
pub mod resolver;
pub mod result;
pub mod scrape;
pub mod server;
pub mod target;
pub mod throttle;

#[cfg(test)]
mod testing;

pub use config::{Config, FetchPolicy};
pub use error::{Result, ScrapeError};
pub use extract::{normalize_count, FieldExtractor, PageFields};
pub use fetcher::{FetchedPage, PageFetcher};
pub use fingerprint::{random_profile, BrowserProfile};
pub use http_client::{HttpClient, RawResponse, Transport};
pub use resolver::{ChannelResolver, LiveVideo, Resolution, Strategy};
pub use result::{ScrapeMode, ScrapeRequest, ScrapeResult, ScrapeStatus};
pub use scrape::LiveScraper;
pub use target::{classify, ChannelTarget, Target, VideoTarget};
pub use throttle::Throttle;
