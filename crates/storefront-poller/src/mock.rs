//! Mock stats fetcher for tests.
//!
//! Responses are configured per URL; every call is recorded. URLs with no
//! configured response fail as a transport error, and URLs marked as hung
//! never complete.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use storefront_core::stats::StatsPayload;

use crate::error::FetchError;
use crate::fetcher::StatFetcher;

#[derive(Debug, Clone)]
enum MockResponse {
    Payload(StatsPayload),
    Status(u16),
    Hang,
}

#[derive(Default)]
pub struct MockStatFetcher {
    responses: Mutex<HashMap<String, MockResponse>>,
    calls: Mutex<Vec<String>>,
}

impl MockStatFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(self, url: &str, payload: StatsPayload) -> Self {
        self.set(url, MockResponse::Payload(payload));
        self
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.set(url, MockResponse::Status(status));
        self
    }

    pub fn with_hang(self, url: &str) -> Self {
        self.set(url, MockResponse::Hang);
        self
    }

    /// Replace the response for `url` after construction.
    pub fn set_payload(&self, url: &str, payload: StatsPayload) {
        self.set(url, MockResponse::Payload(payload));
    }

    /// Remove the response for `url` so the next call fails.
    pub fn clear(&self, url: &str) {
        match self.responses.lock() {
            Ok(mut guard) => {
                guard.remove(url);
            }
            Err(poisoned) => {
                poisoned.into_inner().remove(url);
            }
        }
    }

    pub fn calls(&self) -> Vec<String> {
        match self.calls.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == url).count()
    }

    fn set(&self, url: &str, response: MockResponse) {
        match self.responses.lock() {
            Ok(mut guard) => {
                guard.insert(url.to_string(), response);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(url.to_string(), response);
            }
        }
    }

    fn response(&self, url: &str) -> Option<MockResponse> {
        match self.responses.lock() {
            Ok(guard) => guard.get(url).cloned(),
            Err(poisoned) => poisoned.into_inner().get(url).cloned(),
        }
    }
}

#[async_trait]
impl StatFetcher for MockStatFetcher {
    async fn fetch(&self, url: &str) -> Result<StatsPayload, FetchError> {
        match self.calls.lock() {
            Ok(mut guard) => guard.push(url.to_string()),
            Err(poisoned) => poisoned.into_inner().push(url.to_string()),
        }

        match self.response(url) {
            Some(MockResponse::Payload(payload)) => Ok(payload),
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            Some(MockResponse::Hang) => std::future::pending().await,
            None => Err(FetchError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}
