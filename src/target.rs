//! URL classification.
//!
//! Decides what an input URL points at before any request goes out:
//! a single video, a channel, or nothing we can scrape.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{Result, ScrapeError};

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid video id regex"));

static CHANNEL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^UC[A-Za-z0-9_-]{22}$").expect("valid channel id regex"));

/// Channel tabs that can trail a channel URL.
const CHANNEL_TABS: &[&str] = &["live", "videos", "streams", "featured", "shorts", "about"];

const BASE: &str = "https://www.youtube.com";

/// A single video, identified by its 11-character ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTarget {
    pub id: String,
}

impl VideoTarget {
    pub fn watch_url(&self) -> String {
        watch_url(&self.id)
    }
}

/// A channel, by its canonical base URL (`https://www.youtube.com/@name`,
/// `/channel/UC…`, `/c/name` or `/user/name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTarget {
    pub base_url: String,
    /// Known when the URL itself names it (`/channel/UC…`).
    pub channel_id: Option<String>,
}

impl ChannelTarget {
    pub fn live_url(&self) -> String {
        format!("{}/live", self.base_url)
    }

    pub fn videos_url(&self) -> String {
        format!("{}/videos", self.base_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Video(VideoTarget),
    Channel(ChannelTarget),
}

/// Canonical watch URL for a video ID.
pub fn watch_url(id: &str) -> String {
    format!("{BASE}/watch?v={id}")
}

/// RSS feed of a channel's most recent uploads.
pub fn rss_url(channel_id: &str) -> String {
    format!("{BASE}/feeds/videos.xml?channel_id={channel_id}")
}

pub fn is_video_id(candidate: &str) -> bool {
    VIDEO_ID.is_match(candidate)
}

pub fn is_channel_id(candidate: &str) -> bool {
    CHANNEL_ID.is_match(candidate)
}

/// Classify a URL. Scheme-less input (`youtube.com/...`) is accepted.
pub fn classify(input: &str) -> Result<Target> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::InvalidUrl("URL is empty".into()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| ScrapeError::InvalidUrl(format!("{trimmed}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(trimmed));
    }

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .or_else(|| host.strip_prefix("music."))
        .unwrap_or(&host);

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    match host {
        "youtu.be" => segments
            .first()
            .filter(|id| is_video_id(id))
            .map(|id| video(id))
            .ok_or_else(|| invalid(trimmed)),
        "youtube.com" | "youtube-nocookie.com" => classify_path(&url, &segments)
            .ok_or_else(|| invalid(trimmed)),
        _ => Err(invalid(trimmed)),
    }
}

fn classify_path(url: &Url, segments: &[&str]) -> Option<Target> {
    let first = *segments.first()?;

    if first == "watch" {
        return url
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
            .filter(|id| is_video_id(id))
            .map(|id| video(&id));
    }

    if matches!(first, "live" | "shorts" | "embed" | "v") {
        return segments
            .get(1)
            .filter(|id| is_video_id(id))
            .map(|id| video(id));
    }

    if first.starts_with('@') && first.len() > 1 {
        return channel(&format!("{BASE}/{first}"), None, &segments[1..]);
    }

    match (first, segments.get(1)) {
        ("channel", Some(id)) => {
            let channel_id = is_channel_id(id).then(|| (*id).to_string());
            channel(&format!("{BASE}/channel/{id}"), channel_id, &segments[2..])
        }
        ("c" | "user", Some(name)) => {
            channel(&format!("{BASE}/{first}/{name}"), None, &segments[2..])
        }
        _ => None,
    }
}

fn channel(base_url: &str, channel_id: Option<String>, rest: &[&str]) -> Option<Target> {
    // Only a known tab may trail the channel path
    match rest {
        [] => {}
        [tab] if CHANNEL_TABS.contains(tab) => {}
        _ => return None,
    }
    Some(Target::Channel(ChannelTarget {
        base_url: base_url.to_string(),
        channel_id,
    }))
}

fn video(id: &str) -> Target {
    Target::Video(VideoTarget { id: id.to_string() })
}

fn invalid(input: &str) -> ScrapeError {
    ScrapeError::InvalidUrl(format!("not a YouTube video or channel URL: {input}"))
}
