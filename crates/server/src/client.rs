use std::time::Duration;

use halte::realtime::{FeedError, StopFeed};
use serde_json::Value;

const FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// Live-data client for the OVapi-style endpoint. One instance is shared
/// across handlers; reqwest pools connections internally.
#[derive(Clone)]
pub struct OvClient {
    http: reqwest::Client,
    base_url: String,
}

impl OvClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn fetch_error(code: &str, message: impl ToString) -> FeedError {
        FeedError::Fetch {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

impl StopFeed for OvClient {
    async fn fetch_stop(&self, code: &str) -> Result<Value, FeedError> {
        let url = format!("{}/tpc/{}", self.base_url, code);
        let response = self
            .http
            .get(&url)
            .timeout(FEED_TIMEOUT)
            .send()
            .await
            .map_err(|err| Self::fetch_error(code, err))?;
        if !response.status().is_success() {
            return Err(Self::fetch_error(
                code,
                format!("HTTP {}", response.status()),
            ));
        }
        response
            .json()
            .await
            .map_err(|err| Self::fetch_error(code, err))
    }
}
