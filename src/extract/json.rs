//! Embedded JSON search
//!
//! Watch pages carry two large JSON documents assigned in inline scripts:
//! `ytInitialPlayerResponse` and `ytInitialData`. When none of the textual
//! patterns hit, the extractor parses them and looks for a count by key.

use serde_json::Value;

use super::count::normalize_count;

pub const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";
pub const INITIAL_DATA_MARKER: &str = "ytInitialData";

/// Keys that hold a concurrent viewer count, most specific first.
pub const LIVE_COUNT_KEYS: &[&str] = &[
    "concurrentViewers",
    "concurrentViewerCount",
    "viewerCount",
    "watchingCount",
    "originalViewCount",
];

/// Keys that hold a cumulative view count on recorded videos.
pub const RECORDED_COUNT_KEYS: &[&str] = &["viewCount", "originalViewCount"];

/// A count found in a JSON document, with the key it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountHit<'k> {
    pub key: &'k str,
    pub value: u64,
}

/// Locate `marker = {...}` in the page and parse the object.
///
/// Handles `var ytInitialData = {`, `window["ytInitialData"] = {` and
/// `ytInitialData={`. Tries every occurrence until one parses.
pub fn embedded_json(html: &str, marker: &str) -> Option<Value> {
    let mut search_from = 0;
    while let Some(found) = html[search_from..].find(marker) {
        let after_marker = search_from + found + marker.len();
        search_from = after_marker;

        let rest = html[after_marker..].trim_start_matches(['"', ']', '\'']);
        let Some(rest) = rest.trim_start().strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        if !rest.starts_with('{') {
            continue;
        }

        if let Some(end) = balanced_object_end(rest) {
            match serde_json::from_str(&rest[..end]) {
                Ok(value) => return Some(value),
                Err(e) => tracing::debug!(marker, error = %e, "Embedded JSON did not parse"),
            }
        }
    }
    None
}

/// Byte length of the JSON object at the start of `text`, tracking string
/// literals so braces inside strings don't count.
fn balanced_object_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Search `root` for the first key in `keys` (priority order) holding a
/// non-zero count. Descent stops at `max_depth`.
pub fn find_count<'k>(root: &Value, keys: &[&'k str], max_depth: usize) -> Option<CountHit<'k>> {
    keys.iter().find_map(|&key| {
        search(root, key, 0, max_depth).map(|value| CountHit { key, value })
    })
}

fn search(node: &Value, key: &str, depth: usize, max_depth: usize) -> Option<u64> {
    if depth > max_depth {
        return None;
    }
    match node {
        Value::Object(map) => {
            if let Some(value) = map.get(key) {
                let count = count_of(value);
                if count > 0 {
                    return Some(count);
                }
            }
            map.values()
                .find_map(|child| search(child, key, depth + 1, max_depth))
        }
        Value::Array(items) => items
            .iter()
            .find_map(|child| search(child, key, depth + 1, max_depth)),
        _ => None,
    }
}

/// Interpret a JSON value as a count: numbers, numeric strings, and the
/// renderer shapes `{"simpleText": "..."}` / `{"runs": [{"text": "..."}]}`.
fn count_of(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .unwrap_or(0),
        Value::String(s) => normalize_count(s),
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("simpleText") {
                return normalize_count(text);
            }
            if let Some(Value::Array(runs)) = map.get("runs") {
                let text: String = runs
                    .iter()
                    .filter_map(|run| run.get("text").and_then(Value::as_str))
                    .collect();
                return normalize_count(&text);
            }
            0
        }
        _ => 0,
    }
}

/// `videoDetails.title` from the player response.
pub fn video_title(player_response: &Value) -> Option<&str> {
    player_response
        .pointer("/videoDetails/title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
}

/// `videoDetails.author` from the player response.
pub fn video_author(player_response: &Value) -> Option<&str> {
    player_response
        .pointer("/videoDetails/author")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
}
