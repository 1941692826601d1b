//! Live/Channel Resolver
//!
//! Finds a channel's current live broadcast by trying four strategies in
//! order and stopping at the first one that names a video:
//!
//! 1. **Home page**: live badge next to a `videoId`
//! 2. **`/live`**: YouTube redirects it to the running broadcast
//! 3. **`/videos`**: same badge scan as the home page
//! 4. **RSS feed**: probe the most recent uploads one by one
//!
//! A strategy that fails to fetch is logged and skipped. Finding nothing
//! is a normal outcome, not an error, as long as some page came back.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};
use crate::extract::{extract_channel_name, is_live_now};
use crate::fetcher::{FetchedPage, PageFetcher};
use crate::target::{classify, rss_url, watch_url, ChannelTarget, Target};

/// How far around a live badge to look for its `videoId`.
const BADGE_WINDOW: usize = 4000;

/// Renderer markers that label a listing item as live right now.
const LIVE_BADGES: &[&str] = &[
    "BADGE_STYLE_TYPE_LIVE_NOW",
    "\"style\":\"LIVE\"",
    "\"iconType\":\"LIVE\"",
    "\"text\":\"LIVE\"",
];

static VIDEO_ID_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""videoId"\s*:\s*"([A-Za-z0-9_-]{11})""#).expect("valid videoId regex")
});

static CANONICAL_WATCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<link rel="canonical" href="https://www\.youtube\.com/watch\?v=([A-Za-z0-9_-]{11})""#,
    )
    .expect("valid canonical regex")
});

static RSS_VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<yt:videoId>([A-Za-z0-9_-]{11})</yt:videoId>").expect("valid rss regex")
});

/// Most specific first: `externalId` is the page owner, `channelId` may be
/// a featured channel.
static CHANNEL_ID_SOURCES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#""externalId"\s*:\s*"(UC[A-Za-z0-9_-]{22})""#,
        r#"<meta itemprop="(?:channelId|identifier)" content="(UC[A-Za-z0-9_-]{22})""#,
        r#""channelId"\s*:\s*"(UC[A-Za-z0-9_-]{22})""#,
    ]
    .iter()
    .map(|re| Regex::new(re).expect("valid channel id regex"))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    HomePage,
    LiveRedirect,
    VideosTab,
    RssFeed,
}

impl Strategy {
    pub const ORDER: [Strategy; 4] = [
        Strategy::HomePage,
        Strategy::LiveRedirect,
        Strategy::VideosTab,
        Strategy::RssFeed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::HomePage => "home_page",
            Strategy::LiveRedirect => "live_redirect",
            Strategy::VideosTab => "videos_tab",
            Strategy::RssFeed => "rss_feed",
        }
    }
}

/// A live broadcast the resolver settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveVideo {
    pub video_id: String,
    pub url: String,
    pub strategy: Strategy,
    /// The broadcast's own page, when the strategy already fetched it
    /// (`/live` and the feed probe).
    pub page: Option<FetchedPage>,
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub live: Option<LiveVideo>,
    pub channel_name: Option<String>,
    /// Strategies that ran, in order.
    pub tried: Vec<Strategy>,
    /// At least one page came back. When false, "no live stream" is not
    /// a finding: the channel was never reached.
    pub fetched_any: bool,
    /// Most recent fetch failure.
    pub last_error: Option<ScrapeError>,
}

impl Resolution {
    /// True when nothing is live and not a single page could be fetched.
    pub fn unreachable(&self) -> bool {
        self.live.is_none() && !self.fetched_any
    }
}

/// What a strategy found: a video ID, plus its page if already fetched.
struct Hit {
    video_id: String,
    page: Option<FetchedPage>,
}

impl Hit {
    fn id(video_id: String) -> Self {
        Self {
            video_id,
            page: None,
        }
    }
}

/// What earlier strategies learned that later ones can use.
#[derive(Debug, Default)]
struct Discovered {
    channel_id: Option<String>,
    channel_name: Option<String>,
    fetched_any: bool,
    last_error: Option<ScrapeError>,
}

impl Discovered {
    fn absorb(&mut self, html: &str) {
        self.fetched_any = true;
        if self.channel_id.is_none() {
            self.channel_id = find_channel_id(html);
        }
        if self.channel_name.is_none() {
            self.channel_name = extract_channel_name(html);
        }
    }
}

pub struct ChannelResolver<'a> {
    fetcher: &'a PageFetcher,
    rss_entries: usize,
}

impl<'a> ChannelResolver<'a> {
    pub fn new(fetcher: &'a PageFetcher, rss_entries: usize) -> Self {
        Self {
            fetcher,
            rss_entries,
        }
    }

    pub async fn resolve(&self, channel: &ChannelTarget) -> Resolution {
        let mut found = Discovered {
            channel_id: channel.channel_id.clone(),
            ..Discovered::default()
        };
        let mut tried = Vec::with_capacity(Strategy::ORDER.len());

        for strategy in Strategy::ORDER {
            tried.push(strategy);
            debug!(strategy = strategy.name(), channel = %channel.base_url, "Trying strategy");

            match self.run(strategy, channel, &mut found).await {
                Ok(Some(hit)) => {
                    info!(
                        strategy = strategy.name(),
                        video_id = %hit.video_id,
                        "Found live video"
                    );
                    return Resolution {
                        live: Some(LiveVideo {
                            url: watch_url(&hit.video_id),
                            video_id: hit.video_id,
                            strategy,
                            page: hit.page,
                        }),
                        channel_name: found.channel_name,
                        tried,
                        fetched_any: true,
                        last_error: found.last_error,
                    };
                }
                Ok(None) => debug!(strategy = strategy.name(), "No live video"),
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Strategy failed");
                    found.last_error = Some(e);
                }
            }
        }

        if found.fetched_any {
            info!(channel = %channel.base_url, "No live stream found");
        } else {
            warn!(channel = %channel.base_url, "No channel page could be fetched");
        }
        Resolution {
            live: None,
            channel_name: found.channel_name,
            tried,
            fetched_any: found.fetched_any,
            last_error: found.last_error,
        }
    }

    async fn run(
        &self,
        strategy: Strategy,
        channel: &ChannelTarget,
        found: &mut Discovered,
    ) -> Result<Option<Hit>> {
        match strategy {
            Strategy::HomePage => {
                let page = self.fetcher.fetch(&channel.base_url).await?;
                found.absorb(&page.body);
                Ok(find_live_video_id(&page.body).map(Hit::id))
            }
            Strategy::LiveRedirect => {
                let page = self.fetcher.fetch(&channel.live_url()).await?;
                found.absorb(&page.body);
                Ok(live_redirect_target(&page).map(|video_id| Hit {
                    video_id,
                    page: Some(page),
                }))
            }
            Strategy::VideosTab => {
                let page = self.fetcher.fetch(&channel.videos_url()).await?;
                found.absorb(&page.body);
                Ok(find_live_video_id(&page.body).map(Hit::id))
            }
            Strategy::RssFeed => {
                let Some(channel_id) = found.channel_id.clone() else {
                    debug!("No channel ID known, skipping feed");
                    return Ok(None);
                };
                self.scan_feed(&channel_id, found).await
            }
        }
    }

    async fn scan_feed(&self, channel_id: &str, found: &mut Discovered) -> Result<Option<Hit>> {
        let feed = self.fetcher.fetch(&rss_url(channel_id)).await?;
        found.fetched_any = true;

        for video_id in rss_video_ids(&feed.body).into_iter().take(self.rss_entries) {
            match self.fetcher.fetch(&watch_url(&video_id)).await {
                Ok(page) if is_live_now(&page.body) => {
                    return Ok(Some(Hit {
                        video_id,
                        page: Some(page),
                    }));
                }
                Ok(_) => debug!(%video_id, "Feed entry is not live"),
                Err(e) => warn!(%video_id, error = %e, "Feed entry fetch failed"),
            }
        }
        Ok(None)
    }
}

/// Pair a live badge on a listing page with its `videoId`: the nearest one
/// before the badge, else the nearest after it.
pub fn find_live_video_id(html: &str) -> Option<String> {
    LIVE_BADGES.iter().find_map(|badge| {
        html.match_indices(badge).find_map(|(pos, _)| {
            let start = char_boundary_at_or_before(html, pos.saturating_sub(BADGE_WINDOW));
            let end = char_boundary_at_or_after(html, pos + badge.len() + BADGE_WINDOW);

            VIDEO_ID_FIELD
                .captures_iter(&html[start..pos])
                .last()
                .or_else(|| VIDEO_ID_FIELD.captures(&html[pos..end]))
                .map(|caps| caps[1].to_string())
        })
    })
}

/// Video the `/live` page landed on, provided it is actually live.
fn live_redirect_target(page: &FetchedPage) -> Option<String> {
    if !is_live_now(&page.body) {
        return None;
    }

    if let Ok(Target::Video(video)) = classify(&page.final_url) {
        return Some(video.id);
    }

    CANONICAL_WATCH
        .captures(&page.body)
        .map(|caps| caps[1].to_string())
}

/// Video IDs from a channel feed, newest first.
pub fn rss_video_ids(feed: &str) -> Vec<String> {
    RSS_VIDEO_ID
        .captures_iter(feed)
        .map(|caps| caps[1].to_string())
        .collect()
}

pub fn find_channel_id(html: &str) -> Option<String> {
    CHANNEL_ID_SOURCES
        .iter()
        .find_map(|re| re.captures(html))
        .map(|caps| caps[1].to_string())
}

fn char_boundary_at_or_before(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn char_boundary_at_or_after(s: &str, mut i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
