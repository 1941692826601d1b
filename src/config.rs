//! Configuration loaded from `~/.config/livecount/config.toml`.
//!
//! Every field has a default, so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchPolicy,
    pub resolver: ResolverConfig,
    pub extract: ExtractConfig,
    pub server: ServerConfig,
}

/// Retry, pacing and timeout knobs for the page fetcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchPolicy {
    /// Minimum spacing between two outbound requests.
    pub min_interval_ms: u64,
    /// Random delay range applied before every attempt after the first.
    pub jitter_min_ms: u64,
    pub jitter_max_ms: u64,
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Linear backoff step for network errors and non-2xx responses.
    pub backoff_step_ms: u64,
    /// Backoff step for HTTP 429 without a `Retry-After` header.
    pub rate_limit_step_ms: u64,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            min_interval_ms: 2000,
            jitter_min_ms: 500,
            jitter_max_ms: 2000,
            max_attempts: 3,
            backoff_step_ms: 1000,
            rate_limit_step_ms: 5000,
            timeout_secs: 15,
            connect_timeout_secs: 10,
        }
    }
}

impl FetchPolicy {
    /// Policy with every delay zeroed. Same attempt ceiling as the default.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            min_interval_ms: 0,
            jitter_min_ms: 0,
            jitter_max_ms: 0,
            backoff_step_ms: 0,
            rate_limit_step_ms: 0,
            ..Self::default()
        }
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Linear backoff for the given 1-based attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_step_ms.saturating_mul(u64::from(attempt)))
    }

    /// Attempt-scaled backoff after a 429 with no usable `Retry-After`.
    pub fn rate_limit_backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.rate_limit_step_ms.saturating_mul(u64::from(attempt)))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How many recent RSS entries to probe for a live broadcast.
    pub rss_entries: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { rss_entries: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Depth bound for the recursive search over embedded JSON.
    pub json_max_depth: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { json_max_depth: 64 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location.
    ///
    /// A missing default file yields defaults. A missing explicit path is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let p = config_path();
                if p.exists() {
                    Self::from_file(&p)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("livecount")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.min_interval_ms, 2000);
        assert_eq!(config.fetch.timeout_secs, 15);
        assert_eq!(config.resolver.rss_entries, 5);
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn parse_partial_config_keeps_other_defaults() {
        let toml_str = r#"
[fetch]
max_attempts = 5
jitter_max_ms = 100

[server]
bind = "0.0.0.0:8080"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.fetch.max_attempts, 5);
        assert_eq!(config.fetch.jitter_max_ms, 100);
        assert_eq!(config.fetch.jitter_min_ms, 500);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.extract.json_max_depth, 64);
    }

    #[test]
    fn backoff_scales_with_attempt() {
        let policy = FetchPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(3), Duration::from_millis(3000));
        assert_eq!(policy.rate_limit_backoff(2), Duration::from_millis(10_000));
    }

    #[test]
    fn immediate_policy_has_no_delays() {
        let policy = FetchPolicy::immediate();
        assert_eq!(policy.min_interval(), Duration::ZERO);
        assert_eq!(policy.backoff(3), Duration::ZERO);
        assert_eq!(policy.max_attempts, 3);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let result = Config::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(result.is_err());
    }
}
