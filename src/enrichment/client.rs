//! HTTP client for the external song info service.

use async_trait::async_trait;
use std::time::Duration;

use crate::library_store::SongDetail;

/// Classified result of a single probe against the song info service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 200 with a body that parsed as song detail.
    Found(SongDetail),
    /// 400, the upstream judged the identifying fields invalid.
    Rejected,
    /// 500, a server-side fault worth another attempt.
    Unavailable,
    /// A status outside the service contract, forwarded raw.
    Unexpected(u16),
    /// The request never produced a usable response.
    Failed(String),
}

/// Single-attempt view of the song info service. The retry loop lives in
/// [`super::Enricher`], implementations only classify one exchange.
#[async_trait]
pub trait SongInfoApi: Send + Sync {
    async fn fetch_detail(&self, author: &str, title: &str) -> ProbeOutcome;
}

/// reqwest-backed client talking to the configured base URL.
pub struct HttpSongInfoClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSongInfoClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the song info service (e.g., "http://localhost:8080/info")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, timeout_sec: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        // Ensure base_url doesn't have a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SongInfoApi for HttpSongInfoClient {
    async fn fetch_detail(&self, author: &str, title: &str) -> ProbeOutcome {
        let response = match self
            .client
            .get(&self.base_url)
            .query(&[("group", author), ("song", title)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return ProbeOutcome::Failed(err.to_string()),
        };

        match response.status().as_u16() {
            200 => match response.json::<SongDetail>().await {
                Ok(detail) => ProbeOutcome::Found(detail),
                Err(err) => ProbeOutcome::Failed(format!("unreadable response body: {}", err)),
            },
            400 => ProbeOutcome::Rejected,
            500 => ProbeOutcome::Unavailable,
            status => ProbeOutcome::Unexpected(status),
        }
    }
}
