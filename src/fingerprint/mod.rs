//! Browser Header Rotation
//!
//! Makes each request look like it came from an ordinary desktop browser.
//! The User-Agent is drawn from a fixed pool on every attempt; everything
//! else is a static browser-like header set plus a synthetic consent cookie
//! so the watch page renders without the EU consent interstitial.
//!
//! Best-effort only: the pool drifts out of date and the target site can
//! change what it fingerprints at any time.

use rand::seq::SliceRandom;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL,
    COOKIE, USER_AGENT,
};

/// One entry of the User-Agent pool.
///
/// Chromium-based browsers also send client hints; Firefox and Safari don't.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: &'static str,
    pub sec_ch_ua: Option<&'static str>,
    pub sec_ch_ua_platform: Option<&'static str>,
}

/// Real desktop browser strings from 2024-2025 (high market share)
pub const USER_AGENT_POOL: &[BrowserProfile] = &[
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        sec_ch_ua: Some("\"Google Chrome\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\""),
        sec_ch_ua_platform: Some("\"Windows\""),
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
        sec_ch_ua: Some("\"Google Chrome\";v=\"130\", \"Chromium\";v=\"130\", \"Not_A Brand\";v=\"24\""),
        sec_ch_ua_platform: Some("\"Windows\""),
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        sec_ch_ua: Some("\"Google Chrome\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\""),
        sec_ch_ua_platform: Some("\"macOS\""),
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36",
        sec_ch_ua: Some("\"Google Chrome\";v=\"129\", \"Chromium\";v=\"129\", \"Not=A?Brand\";v=\"8\""),
        sec_ch_ua_platform: Some("\"Linux\""),
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
        sec_ch_ua: Some("\"Microsoft Edge\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\""),
        sec_ch_ua_platform: Some("\"Windows\""),
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
        sec_ch_ua: None,
        sec_ch_ua_platform: None,
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:132.0) Gecko/20100101 Firefox/132.0",
        sec_ch_ua: None,
        sec_ch_ua_platform: None,
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.6 Safari/605.1.15",
        sec_ch_ua: None,
        sec_ch_ua_platform: None,
    },
];

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

/// Consent + locale cookies. Keeps the page in English so the textual
/// patterns ("watching now", "views") match.
pub const SYNTHETIC_COOKIES: &str =
    "CONSENT=YES+cb.20240101-00-p0.en+FX+000; SOCS=CAI; PREF=hl=en&gl=US; YSC=livecount";

/// Pick a profile from the pool.
#[must_use]
pub fn random_profile() -> BrowserProfile {
    let mut rng = rand::thread_rng();
    *USER_AGENT_POOL
        .choose(&mut rng)
        .unwrap_or(&USER_AGENT_POOL[0])
}

impl BrowserProfile {
    /// Whether this profile sends Sec-CH-UA client hints.
    pub fn sends_client_hints(&self) -> bool {
        self.sec_ch_ua.is_some()
    }

    /// Convert profile to reqwest `HeaderMap`
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(self.user_agent));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br, zstd"));

        if let (Some(ua), Some(platform)) = (self.sec_ch_ua, self.sec_ch_ua_platform) {
            headers.insert(
                HeaderName::from_static("sec-ch-ua"),
                HeaderValue::from_static(ua),
            );
            headers.insert(
                HeaderName::from_static("sec-ch-ua-mobile"),
                HeaderValue::from_static("?0"),
            );
            headers.insert(
                HeaderName::from_static("sec-ch-ua-platform"),
                HeaderValue::from_static(platform),
            );
        }

        // Sec-Fetch headers (all modern browsers)
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("document"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("navigate"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("none"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-user"),
            HeaderValue::from_static("?1"),
        );

        headers.insert(
            HeaderName::from_static("upgrade-insecure-requests"),
            HeaderValue::from_static("1"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert(COOKIE, HeaderValue::from_static(SYNTHETIC_COOKIES));

        headers
    }
}

#[cfg(test)]
mod tests;
