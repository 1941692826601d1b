//! Scrape pipeline: classify → resolve → fetch → extract.
//!
//! [`LiveScraper::scrape`] never fails. Every error becomes a result with
//! `status: "error"` and a message. A channel whose pages all failed to
//! fetch is such an error, not "no live stream".

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::extract::FieldExtractor;
use crate::fetcher::{FetchedPage, PageFetcher};
use crate::http_client::Transport;
use crate::resolver::{ChannelResolver, Resolution};
use crate::result::{ScrapeMode, ScrapeRequest, ScrapeResult};
use crate::target::{classify, Target};

pub struct LiveScraper {
    fetcher: PageFetcher,
    extractor: FieldExtractor,
    rss_entries: usize,
}

impl LiveScraper {
    /// Scraper over an arbitrary transport.
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self {
            fetcher: PageFetcher::new(transport, config.fetch.clone()),
            extractor: FieldExtractor::new(config.extract.json_max_depth),
            rss_entries: config.resolver.rss_entries,
        }
    }

    /// Scraper over a real HTTP client.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            fetcher: PageFetcher::with_http_client(config.fetch.clone())?,
            extractor: FieldExtractor::new(config.extract.json_max_depth),
            rss_entries: config.resolver.rss_entries,
        })
    }

    #[instrument(skip(self, request), fields(url = %request.url, mode = ?request.mode))]
    pub async fn scrape(&self, request: &ScrapeRequest) -> ScrapeResult {
        match self.try_scrape(request).await {
            Ok(result) => {
                info!(
                    status = ?result.status,
                    viewers = result.viewers,
                    is_live = result.is_live,
                    "Scrape finished"
                );
                result
            }
            Err(e) => {
                warn!(error = %e, "Scrape failed");
                ScrapeResult::error(&request.url, e.to_string())
            }
        }
    }

    async fn try_scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResult> {
        let target = classify(&request.url)?;
        let mode = request.mode.unwrap_or(match target {
            Target::Video(_) => ScrapeMode::Video,
            Target::Channel(_) => ScrapeMode::Channel,
        });

        match (mode, target) {
            (ScrapeMode::Video, Target::Channel(_)) => Err(ScrapeError::InvalidUrl(format!(
                "video mode needs a video URL, got a channel: {}",
                request.url
            ))),
            (_, Target::Video(video)) => self.scrape_video(&request.url, &video.watch_url()).await,
            (ScrapeMode::Channel, Target::Channel(channel)) => {
                let resolution = ChannelResolver::new(&self.fetcher, self.rss_entries)
                    .resolve(&channel)
                    .await;
                self.scrape_resolved(&request.url, resolution).await
            }
        }
    }

    async fn scrape_resolved(&self, url: &str, resolution: Resolution) -> Result<ScrapeResult> {
        if resolution.unreachable() {
            return Err(resolution.last_error.unwrap_or_else(|| ScrapeError::FetchFailure {
                url: url.to_string(),
                attempts: 0,
                status: None,
                message: "no channel page could be fetched".to_string(),
            }));
        }

        let Some(live) = resolution.live else {
            return Ok(ScrapeResult::no_live_stream(url, resolution.channel_name));
        };

        let page = match live.page {
            Some(page) => page,
            None => match self.fetcher.fetch(&live.url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, live_url = %live.url, "Live video page fetch failed");
                    let mut result = ScrapeResult::error(url, e.to_string());
                    result.channel_name = resolution.channel_name;
                    result.redirected_url = Some(live.url);
                    return Ok(result);
                }
            },
        };

        let mut result = self.scrape_page(url, &page);
        result.redirected_url = Some(live.url);
        if result.channel_name.is_none() {
            result.channel_name = resolution.channel_name;
        }
        Ok(result)
    }

    async fn scrape_video(&self, original_url: &str, watch_url: &str) -> Result<ScrapeResult> {
        let page = self.fetcher.fetch(watch_url).await?;
        let mut result = self.scrape_page(original_url, &page);
        if page.was_redirected() {
            result.redirected_url = Some(page.final_url);
        }
        Ok(result)
    }

    fn scrape_page(&self, original_url: &str, page: &FetchedPage) -> ScrapeResult {
        ScrapeResult::success(original_url, self.extractor.extract(&page.body))
    }
}
