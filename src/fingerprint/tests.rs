//! Unit tests for header rotation

use super::*;

#[test]
fn test_pool_not_empty() {
    assert!(USER_AGENT_POOL.len() >= 4, "pool should offer real variety");
}

#[test]
fn test_random_profile_comes_from_pool() {
    for _ in 0..20 {
        let profile = random_profile();
        assert!(USER_AGENT_POOL.contains(&profile));
    }
}

#[test]
fn test_pool_entries_are_browser_strings() {
    for profile in USER_AGENT_POOL {
        assert!(profile.user_agent.starts_with("Mozilla/5.0 ("));
        assert_eq!(profile.sec_ch_ua.is_some(), profile.sec_ch_ua_platform.is_some());
    }
}

#[test]
fn test_profile_to_headers_includes_required() {
    let profile = random_profile();
    let headers = profile.to_headers();

    assert!(headers.contains_key("user-agent"));
    assert!(headers.contains_key("accept"));
    assert!(headers.contains_key("accept-language"));
    assert!(headers.contains_key("sec-fetch-mode"));
    assert_eq!(headers["cookie"], SYNTHETIC_COOKIES);
    assert_eq!(headers["user-agent"], profile.user_agent);
}

#[test]
fn test_firefox_no_sec_ch_ua() {
    let firefox = USER_AGENT_POOL
        .iter()
        .find(|p| p.user_agent.contains("Firefox"))
        .unwrap();
    assert!(!firefox.sends_client_hints());
    let headers = firefox.to_headers();
    assert!(!headers.contains_key("sec-ch-ua"));
    assert!(!headers.contains_key("sec-ch-ua-platform"));
}

#[test]
fn test_chrome_sends_client_hints() {
    let chrome = USER_AGENT_POOL
        .iter()
        .find(|p| p.user_agent.contains("Chrome/131") && !p.user_agent.contains("Edg/"))
        .unwrap();
    let headers = chrome.to_headers();
    assert!(headers.contains_key("sec-ch-ua"));
    assert_eq!(headers["sec-ch-ua-mobile"], "?0");
}
