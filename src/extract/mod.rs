//! Field Extractor
//!
//! Recovers title, live flag, viewer count and channel name from raw watch
//! page text. Nothing in here fails: a miss is an empty title, `false` or 0.
//!
//! ## Viewer count stages
//!
//! 1. Ordered textual patterns, chosen by whether the page looks live
//! 2. Recursive key search over `ytInitialPlayerResponse`
//! 3. Same search over `ytInitialData`
//!
//! The first non-zero count wins.

pub mod count;
pub mod json;

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

pub use count::normalize_count;
pub use json::{embedded_json, find_count, CountHit};

use json::{
    INITIAL_DATA_MARKER, LIVE_COUNT_KEYS, PLAYER_RESPONSE_MARKER, RECORDED_COUNT_KEYS,
};

/// Markers whose presence means the page is (or was) a live broadcast.
/// Plain existence checks, OR'ed together.
pub const LIVE_MARKERS: &[&str] = &[
    "watching now",
    "\"isLive\":true",
    "\"isLiveNow\":true",
    "\"isLiveContent\":true",
    "BADGE_STYLE_TYPE_LIVE_NOW",
    "assistindo agora",
    "viendo ahora",
    "personnes regardent",
    "Zuschauer",
];

struct CountPattern {
    name: &'static str,
    regex: Regex,
}

fn pattern(name: &'static str, re: &str) -> CountPattern {
    CountPattern {
        name,
        regex: Regex::new(re).expect("valid count pattern"),
    }
}

static LIVE_PATTERNS: LazyLock<Vec<CountPattern>> = LazyLock::new(|| {
    vec![
        // "concurrentViewers":"1234" in the player response
        pattern("concurrent_viewers", r#""concurrentViewers"\s*:\s*"?(\d+)"#),
        pattern("original_view_count", r#""originalViewCount"\s*:\s*"?(\d+)"#),
        // "viewCount":{"runs":[{"text":"1,234"},{"text":" watching now"}]}
        pattern(
            "view_count_runs",
            r#""viewCount"\s*:\s*\{\s*"runs"\s*:\s*\[\s*\{\s*"text"\s*:\s*"([^"]+)""#,
        ),
        pattern("watching_text", r"(?i)(\d[\d,.]*\s?[KMB]?)\s+watching"),
        pattern(
            "localized_watching",
            r"(?i)(\d[\d,.]*\s?[KMB]?)\s+(?:espectadores|assistindo|spectateurs|Zuschauer)",
        ),
    ]
});

static RECORDED_PATTERNS: LazyLock<Vec<CountPattern>> = LazyLock::new(|| {
    vec![
        pattern("view_count", r#""viewCount"\s*:\s*"(\d+)""#),
        pattern("views_text", r"(?i)(\d[\d,.]*\s?[KMB]?)\s+views"),
    ]
});

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#\d+|[a-zA-Z]+);").expect("valid entity regex")
});

static OWNER_CHANNEL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""ownerChannelName"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid owner regex")
});

static ITEMPROP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<link itemprop="name" content="([^"]*)""#).expect("valid itemprop regex")
});

static OG_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta property="og:title" content="([^"]*)""#).expect("valid og:title regex")
});

/// Everything the extractor could read off one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFields {
    pub title: String,
    pub is_live: bool,
    pub viewers: u64,
    pub channel_name: Option<String>,
    /// Which pattern or JSON key produced `viewers`.
    pub count_source: Option<String>,
}

/// Field extractor with a bounded JSON search depth
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    json_max_depth: usize,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(64)
    }
}

impl FieldExtractor {
    pub fn new(json_max_depth: usize) -> Self {
        Self { json_max_depth }
    }

    pub fn extract(&self, html: &str) -> PageFields {
        let is_live = is_live(html);
        let player = embedded_json(html, PLAYER_RESPONSE_MARKER);

        let mut title = extract_title(html);
        if title.is_empty() {
            if let Some(t) = player.as_ref().and_then(json::video_title) {
                title = t.to_string();
            }
        }

        let channel_name = extract_channel_name(html)
            .or_else(|| player.as_ref().and_then(json::video_author).map(str::to_string));

        let (viewers, count_source) = match match_patterns(html, is_live) {
            Some((name, value)) => (value, Some(format!("pattern:{name}"))),
            None => self
                .search_embedded(html, player.as_ref(), is_live)
                .map_or((0, None), |hit| (hit.value, Some(format!("json:{}", hit.key)))),
        };

        debug!(is_live, viewers, source = ?count_source, "Extracted page fields");

        PageFields {
            title,
            is_live,
            viewers,
            channel_name,
            count_source,
        }
    }

    fn search_embedded(
        &self,
        html: &str,
        player: Option<&Value>,
        is_live: bool,
    ) -> Option<CountHit<'static>> {
        let keys = if is_live {
            LIVE_COUNT_KEYS
        } else {
            RECORDED_COUNT_KEYS
        };

        player
            .and_then(|doc| find_count(doc, keys, self.json_max_depth))
            .or_else(|| {
                embedded_json(html, INITIAL_DATA_MARKER)
                    .and_then(|doc| find_count(&doc, keys, self.json_max_depth))
            })
    }
}

/// Also set on broadcasts that have already ended.
const LIVE_CONTENT_MARKER: &str = "\"isLiveContent\":true";

/// True if any live marker appears in the page.
pub fn is_live(html: &str) -> bool {
    LIVE_MARKERS.iter().any(|marker| html.contains(marker))
}

/// Stricter [`is_live`]: ignores `isLiveContent`, which stays set after a
/// broadcast ends. Used when picking a channel's current stream.
pub fn is_live_now(html: &str) -> bool {
    LIVE_MARKERS
        .iter()
        .filter(|marker| **marker != LIVE_CONTENT_MARKER)
        .any(|marker| html.contains(marker))
}

/// First pattern with a non-zero count, by name.
fn match_patterns(html: &str, is_live: bool) -> Option<(&'static str, u64)> {
    let patterns = if is_live {
        &*LIVE_PATTERNS
    } else {
        &*RECORDED_PATTERNS
    };

    patterns.iter().find_map(|p| {
        p.regex
            .captures_iter(html)
            .map(|caps| normalize_count(&caps[1]))
            .find(|&n| n > 0)
            .map(|n| (p.name, n))
    })
}

/// `<title>` text, unescaped, without the ` - YouTube` suffix.
pub fn extract_title(html: &str) -> String {
    TITLE
        .captures(html)
        .map(|caps| {
            let title = unescape_html(caps[1].trim());
            title
                .strip_suffix(" - YouTube")
                .unwrap_or(&title)
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

/// Best-effort channel name: owner field, itemprop, then `og:title`.
pub fn extract_channel_name(html: &str) -> Option<String> {
    if let Some(caps) = OWNER_CHANNEL_NAME.captures(html) {
        let raw = format!("\"{}\"", &caps[1]);
        if let Ok(name) = serde_json::from_str::<String>(&raw) {
            if !name.is_empty() {
                return Some(name);
            }
        }
    }

    [&*ITEMPROP_NAME, &*OG_TITLE]
        .iter()
        .find_map(|re| re.captures(html))
        .map(|caps| unescape_html(&caps[1]))
        .filter(|name| !name.is_empty())
}

/// Decode common named entities and numeric character references.
/// Unknown entities are left as they are.
pub fn unescape_html(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
