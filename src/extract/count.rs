//! Count Normalizer
//!
//! Turns free-form count text ("12,345", "3.2K", "1M watching") into an
//! integer. Never fails: anything unparseable is 0.

use std::sync::LazyLock;

use regex::Regex;

static SUFFIXED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d[\d,.]*)([KMB])?").expect("valid suffixed count regex")
});

/// "1.234", "12.345": a dotted thousands group as written in pt, es and de.
static DOTTED_THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}\.\d{3}$").expect("valid dotted thousands regex"));

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,.]*").expect("valid digit run regex"));

/// Parse viewer-count text into a non-negative integer.
pub fn normalize_count(text: &str) -> u64 {
    let cleaned: String = text
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | 'K' | 'M' | 'B'))
        .collect();

    if let Some(caps) = SUFFIXED.captures(&cleaned) {
        let suffix = caps.get(2).map(|m| m.as_str());
        if let Some(value) = parse_decimal(&caps[1], suffix.is_some()) {
            let multiplier = match suffix {
                Some("K") => 1e3,
                Some("M") => 1e6,
                Some("B") => 1e9,
                _ => 1.0,
            };
            let scaled = (value * multiplier).round();
            if scaled.is_finite() && scaled >= 0.0 && scaled < u64::MAX as f64 {
                return scaled as u64;
            }
        }
    }

    DIGIT_RUN
        .find(text)
        .map(|m| m.as_str().replace([',', '.'], ""))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

/// Commas are thousands separators. A single period is a decimal point,
/// except in an unsuffixed `d.ddd` group; several periods are thousands
/// separators too ("1.234.567").
fn parse_decimal(number: &str, suffixed: bool) -> Option<f64> {
    let number = number.trim_end_matches([',', '.']);
    let without_commas = number.replace(',', "");
    let dotted_group = !suffixed && DOTTED_THOUSANDS.is_match(&without_commas);
    let normalized = if dotted_group || without_commas.matches('.').count() > 1 {
        without_commas.replace('.', "")
    } else {
        without_commas
    };
    normalized.parse().ok()
}
