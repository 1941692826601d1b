use anyhow::{bail, Result};

use livecount::{Config, LiveScraper, ScrapeMode, ScrapeRequest};

use super::output::print_result;
use crate::OutputFormat;

pub async fn cmd_scrape(
    config: &Config,
    url: &str,
    mode: Option<ScrapeMode>,
    format: OutputFormat,
) -> Result<()> {
    let scraper = LiveScraper::from_config(config)?;
    let result = scraper.scrape(&ScrapeRequest::new(url, mode)).await;

    print_result(&result, format)?;

    if !result.is_success() {
        bail!(
            "scrape failed: {}",
            result.message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
