//! Stats fetcher seam and its HTTP implementation.
//!
//! Implementations report failures as [`FetchError`]; callers go through
//! [`fetch_or_sentinel`], which turns any failure into the empty sentinel
//! payload so a poll never fails the console.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;

use storefront_core::stats::{StatsOutcome, StatsPayload, STATS_PATH};

use crate::error::FetchError;
use crate::logging::Logger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub request_timeout: Duration,
    pub stats_path: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            stats_path: STATS_PATH.to_string(),
        }
    }
}

/// Builds `{instance_url}{stats_path}` without doubling the slash.
#[must_use]
pub fn stats_url(instance_url: &str, stats_path: &str) -> String {
    let base = instance_url.trim_end_matches('/');
    if stats_path.starts_with('/') {
        format!("{base}{stats_path}")
    } else {
        format!("{base}/{stats_path}")
    }
}

#[async_trait]
pub trait StatFetcher: Send + Sync {
    /// Issues one stats request against a fully built stats URL.
    async fn fetch(&self, url: &str) -> Result<StatsPayload, FetchError>;
}

pub struct HttpStatFetcher {
    client: reqwest::Client,
}

impl HttpStatFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl StatFetcher for HttpStatFetcher {
    async fn fetch(&self, url: &str) -> Result<StatsPayload, FetchError> {
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<StatsPayload>()
            .await
            .map_err(|e| FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

/// Runs one fetch and never fails: errors become the sentinel outcome.
pub async fn fetch_or_sentinel(
    fetcher: &dyn StatFetcher,
    url: &str,
    logger: &Logger,
) -> StatsOutcome {
    match fetcher.fetch(url).await {
        Ok(payload) => {
            logger.debug_with("stats received", &[("url", url)]);
            StatsOutcome::responded(payload)
        }
        Err(err) => {
            let error = err.to_string();
            logger.warn_with("instance not responding", &[("error", error.as_str())]);
            StatsOutcome::not_responding()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{stats_url, FetchConfig};

    #[test]
    fn stats_url_joins_without_double_slash() {
        assert_eq!(
            stats_url("http://a:8080/storefront/", "/api/stats?includeStorefront=true"),
            "http://a:8080/storefront/api/stats?includeStorefront=true"
        );
        assert_eq!(stats_url("http://a", "api/stats"), "http://a/api/stats");
    }

    #[test]
    fn default_path_includes_storefront_stats() {
        assert_eq!(
            FetchConfig::default().stats_path,
            "/api/stats?includeStorefront=true"
        );
    }
}
