use std::time::Duration;

use anyhow::{bail, Result};
use tracing::info;

use livecount::{Config, LiveScraper, ScrapeMode, ScrapeRequest};

use super::output::print_sample;
use crate::OutputFormat;

pub async fn cmd_watch(
    config: &Config,
    url: &str,
    mode: Option<ScrapeMode>,
    interval_secs: u64,
    count: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    if interval_secs == 0 {
        bail!("--interval must be at least 1 second");
    }

    let scraper = LiveScraper::from_config(config)?;
    let request = ScrapeRequest::new(url, mode);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    let mut samples = 0usize;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!(samples, "Interrupted");
                break;
            }
        }

        let result = scraper.scrape(&request).await;
        print_sample(&result, format)?;
        samples += 1;

        if count.is_some_and(|limit| samples >= limit) {
            break;
        }
    }

    Ok(())
}
