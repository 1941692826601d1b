use anyhow::Result;

use livecount::{server, Config, LiveScraper};

pub async fn cmd_serve(config: &Config, bind: Option<&str>) -> Result<()> {
    let addr = bind.unwrap_or(&config.server.bind);
    let scraper = LiveScraper::from_config(config)?;

    println!("🚀 Serving POST /api/scrape on http://{addr}");
    server::serve(scraper, addr).await
}
