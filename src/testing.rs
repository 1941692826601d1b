//! Scripted transport for network-free tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::http_client::{RawResponse, Transport};

#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Page {
        status: u16,
        body: String,
        final_url: Option<String>,
        retry_after: Option<Duration>,
    },
    NetworkError(String),
}

impl Scripted {
    pub(crate) fn ok(body: impl Into<String>) -> Self {
        Self::Page {
            status: 200,
            body: body.into(),
            final_url: None,
            retry_after: None,
        }
    }

    pub(crate) fn status(code: u16) -> Self {
        Self::Page {
            status: code,
            body: String::new(),
            final_url: None,
            retry_after: None,
        }
    }

    pub(crate) fn redirected_to(mut self, url: &str) -> Self {
        if let Self::Page { final_url, .. } = &mut self {
            *final_url = Some(url.to_string());
        }
        self
    }

    pub(crate) fn with_retry_after(mut self, delay: Duration) -> Self {
        if let Self::Page { retry_after, .. } = &mut self {
            *retry_after = Some(delay);
        }
        self
    }
}

/// Answers each URL from its own queue. The last queued answer repeats;
/// unknown URLs get a 404.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, HeaderMap)>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(self, url: &str, answer: Scripted) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(answer);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn headers_sent(&self) -> Vec<HeaderMap> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, headers)| headers.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<RawResponse> {
        self.calls.lock().unwrap().push((url.to_string(), headers));

        let answer = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match answer.unwrap_or_else(|| Scripted::status(404)) {
            Scripted::Page {
                status,
                body,
                final_url,
                retry_after,
            } => Ok(RawResponse {
                status: StatusCode::from_u16(status)?,
                final_url: final_url.unwrap_or_else(|| url.to_string()),
                retry_after,
                body,
            }),
            Scripted::NetworkError(message) => Err(anyhow!(message)),
        }
    }
}
