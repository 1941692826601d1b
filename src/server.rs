//! HTTP endpoint
//!
//! - `POST /api/scrape` takes `{url, mode?}` and answers with a
//!   [`ScrapeResult`]. Scrape failures are still `200`; only a missing URL
//!   or an unreadable body is `400`.
//! - `GET /health` answers `{"status":"ok"}`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::result::{ScrapeRequest, ScrapeResult};
use crate::scrape::LiveScraper;

/// Body of a `400` answer.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    fn bad_request(message: impl Into<String>) -> Response {
        let body = Self {
            status: "error",
            message: message.into(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

async fn scrape(
    State(scraper): State<Arc<LiveScraper>>,
    payload: std::result::Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected request body");
            return ErrorResponse::bad_request(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ));
        }
    };

    if request.url.trim().is_empty() {
        return ErrorResponse::bad_request("URL is required");
    }

    let result: ScrapeResult = scraper.scrape(&request).await;
    Json(result).into_response()
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Create the router for the scrape API
pub fn create_router(scraper: Arc<LiveScraper>) -> Router {
    Router::new()
        .route("/api/scrape", post(scrape))
        .route("/health", get(health))
        .with_state(scraper)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(scraper: LiveScraper, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "Scrape API listening");

    axum::serve(listener, create_router(Arc::new(scraper)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::{Config, FetchPolicy};
    use crate::testing::{Scripted, ScriptedTransport};

    const WATCH: &str = "https://www.youtube.com/watch?v=abc12345678";

    fn router(transport: ScriptedTransport) -> (Router, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let config = Config {
            fetch: FetchPolicy::immediate(),
            ..Config::default()
        };
        let scraper = LiveScraper::new(transport.clone(), &config);
        (create_router(Arc::new(scraper)), transport)
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/scrape")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn scrape_live_video() {
        let page = r#"<title>Stream - YouTube</title>"isLiveContent":true <b>1,234 watching</b>"#;
        let (app, _) = router(ScriptedTransport::new().on(WATCH, Scripted::ok(page)));

        let (status, json) =
            post_json(app, &format!(r#"{{"url":"{WATCH}","mode":"video"}}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["viewers"], 1234);
        assert_eq!(json["isLive"], true);
        assert_eq!(json["status"], "success");
        assert_eq!(json["title"], "Stream");
        assert_eq!(json["url"], WATCH);
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn missing_url_is_bad_request() {
        let (app, transport) = router(ScriptedTransport::new());
        let (status, json) = post_json(app, r#"{"mode":"video"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "URL is required");
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (app, _) = router(ScriptedTransport::new());
        let (status, json) = post_json(app, "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["status"], "error");

        let (app, _) = router(ScriptedTransport::new());
        let (status, _) = post_json(app, r#"{"url":"x","mode":"playlist"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn scrape_errors_are_reported_in_a_200() {
        let (app, transport) = router(ScriptedTransport::new());
        let (status, json) = post_json(app, r#"{"url":"https://example.com/video"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "error");
        assert_eq!(json["viewers"], 0);
        assert!(json["message"].as_str().unwrap().contains("Invalid URL"));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn health_check() {
        let (app, _) = router(ScriptedTransport::new());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"status":"ok"}"#);
    }
}
