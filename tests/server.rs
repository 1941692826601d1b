//! End-to-end tests of the scrape endpoint over a canned transport.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use reqwest::header::HeaderMap;
use serde_json::Value;
use tower::ServiceExt;

use livecount::server::create_router;
use livecount::{Config, FetchPolicy, LiveScraper, RawResponse, Transport};

/// Serves fixed pages by URL; everything else is a 404.
#[derive(Default)]
struct CannedPages {
    pages: HashMap<String, (u16, String)>,
    requested: Mutex<Vec<String>>,
}

impl CannedPages {
    fn page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(url.to_string(), (status, body.to_string()));
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for CannedPages {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<RawResponse> {
        assert!(headers.contains_key("user-agent"));
        self.requested.lock().unwrap().push(url.to_string());

        let (status, body) = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or((404, String::new()));
        Ok(RawResponse {
            status: StatusCode::from_u16(status)?,
            final_url: url.to_string(),
            retry_after: None,
            body,
        })
    }
}

async fn scrape(pages: Arc<CannedPages>, body: &str) -> (StatusCode, Value) {
    let config = Config {
        fetch: FetchPolicy::immediate(),
        ..Config::default()
    };
    let app = create_router(Arc::new(LiveScraper::new(pages, &config)));

    let response = app
        .oneshot(
            Request::post("/api/scrape")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn live_video_page() {
    let watch = "https://www.youtube.com/watch?v=abc12345678";
    let pages = Arc::new(CannedPages::default().page(
        watch,
        200,
        r#"<title>Rocket launch - YouTube</title><script>{"isLiveContent":true}</script><span>1,234 watching</span>"#,
    ));

    let (status, json) = scrape(
        pages.clone(),
        &format!(r#"{{"url":"{watch}","mode":"video"}}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["viewers"], 1234);
    assert_eq!(json["isLive"], true);
    assert_eq!(json["status"], "success");
    assert_eq!(json["title"], "Rocket launch");
    assert_eq!(pages.requested(), vec![watch.to_string()]);
}

#[tokio::test]
async fn channel_resolved_through_live_tab() {
    let base = "https://www.youtube.com/channel/UCSJ4gkVC6NrvII8umztf0Ow";
    let live_id = "LiVe_123-ab";
    let watch = format!("https://www.youtube.com/watch?v={live_id}");
    let pages = Arc::new(
        CannedPages::default()
            .page(base, 200, r#"<meta property="og:title" content="Launch Control">"#)
            .page(
                &format!("{base}/live"),
                200,
                &format!(
                    r#"<link rel="canonical" href="{watch}">"isLiveNow":true "concurrentViewers":"31337""#
                ),
            ),
    );

    let (status, json) = scrape(pages.clone(), &format!(r#"{{"url":"{base}"}}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["viewers"], 31337);
    assert_eq!(json["redirectedUrl"], watch);
    assert_eq!(json["channelName"], "Launch Control");
    assert_eq!(json["url"], base);
    // the /live page is the broadcast page; it is not fetched twice
    assert_eq!(pages.requested().len(), 2);
    assert!(!pages.requested().contains(&watch));
}

#[tokio::test]
async fn unreachable_channel_is_an_error() {
    let pages = Arc::new(CannedPages::default());
    let (status, json) = scrape(pages.clone(), r#"{"url":"https://www.youtube.com/@gone"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains("404"));
    assert_eq!(pages.requested().len(), 3);
}

#[tokio::test]
async fn blocked_page_is_an_error_result() {
    let watch = "https://www.youtube.com/watch?v=abc12345678";
    let pages = Arc::new(CannedPages::default().page(watch, 403, "blocked"));

    let (status, json) = scrape(pages.clone(), &format!(r#"{{"url":"{watch}"}}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains("403"));
    assert_eq!(pages.requested().len(), 1);
}

#[tokio::test]
async fn empty_url_is_rejected_without_fetching() {
    let pages = Arc::new(CannedPages::default());
    let (status, json) = scrape(pages.clone(), r#"{"url":"   "}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "error");
    assert!(pages.requested().is_empty());
}
