//! Content host client
//!
//! The dataset lives behind an HTTP content API: one GET per record path,
//! optional bearer-token auth, body shaped `{"content": "<base64>"}`. A
//! non-success status is `RemoteUnavailable`; a success body without the
//! content framing is `MalformedRecord`. Absence of a record at a path is
//! common (the dataset is sparse) and surfaces as `RemoteUnavailable` from
//! the host's 404, which callers treat as a normal miss.

use klq_common::{Error, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "klq/0.1.0 (+https://github.com/klq/klq)";

/// HTTP client for the chart record content host
pub struct DatasetClient {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl DatasetClient {
    pub fn new(base_url: String, token: Option<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Fetch the base64 content string for one record path
    pub async fn fetch_content(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "Fetching record from content host");

        let mut request = self.http_client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::RemoteUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteUnavailable(format!(
                "content host returned {} for {}",
                status, path
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::MalformedRecord(format!("unreadable content body: {}", e)))?;

        body.get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedRecord(format!("no content field for {}", path)))
    }
}
