//! Request and result types shared by the library, the CLI and the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extract::PageFields;

/// What the caller wants scraped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ScrapeMode {
    /// A single video page.
    Video,
    /// Find the channel's current live broadcast first.
    Channel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: String,
    /// Inferred from the URL when absent.
    #[serde(default)]
    pub mode: Option<ScrapeMode>,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>, mode: Option<ScrapeMode>) -> Self {
        Self {
            url: url.into(),
            mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    Success,
    Error,
}

/// Outcome of one scrape. Failures are carried here too, never thrown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub viewers: u64,
    pub is_live: bool,
    pub title: String,
    pub status: ScrapeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// URL as the caller supplied it.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    /// Live video the channel resolved to, or where the page redirected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirected_url: Option<String>,
}

impl ScrapeResult {
    pub fn success(url: &str, fields: PageFields) -> Self {
        Self {
            viewers: fields.viewers,
            is_live: fields.is_live,
            title: fields.title,
            status: ScrapeStatus::Success,
            message: None,
            timestamp: Utc::now(),
            url: url.to_string(),
            channel_name: fields.channel_name,
            redirected_url: None,
        }
    }

    /// Channel resolved fine but nothing is live right now.
    pub fn no_live_stream(url: &str, channel_name: Option<String>) -> Self {
        Self {
            viewers: 0,
            is_live: false,
            title: String::new(),
            status: ScrapeStatus::Success,
            message: Some("No live stream found for this channel".to_string()),
            timestamp: Utc::now(),
            url: url.to_string(),
            channel_name,
            redirected_url: None,
        }
    }

    pub fn error(url: &str, message: impl Into<String>) -> Self {
        Self {
            viewers: 0,
            is_live: false,
            title: String::new(),
            status: ScrapeStatus::Error,
            message: Some(message.into()),
            timestamp: Utc::now(),
            url: url.to_string(),
            channel_name: None,
            redirected_url: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ScrapeStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_and_omits_empty_options() {
        let result = ScrapeResult::success(
            "https://youtu.be/abc12345678",
            PageFields {
                title: "Stream".into(),
                is_live: true,
                viewers: 42,
                channel_name: None,
                count_source: None,
            },
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["viewers"], 42);
        assert_eq!(json["isLive"], true);
        assert_eq!(json["status"], "success");
        assert!(json.get("message").is_none());
        assert!(json.get("channelName").is_none());
        assert!(json.get("redirectedUrl").is_none());
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn error_result_carries_message() {
        let result = ScrapeResult::error("bad", "Invalid URL: bad");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Invalid URL: bad");
        assert_eq!(json["viewers"], 0);
        assert!(!result.is_success());
    }

    #[test]
    fn request_mode_is_optional() {
        let req: ScrapeRequest = serde_json::from_str(r#"{"url":"https://youtu.be/x"}"#).unwrap();
        assert_eq!(req.mode, None);

        let req: ScrapeRequest =
            serde_json::from_str(r#"{"url":"https://youtu.be/x","mode":"channel"}"#).unwrap();
        assert_eq!(req.mode, Some(ScrapeMode::Channel));

        let req: ScrapeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.url.is_empty());
    }
}
