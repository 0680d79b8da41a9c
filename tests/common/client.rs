//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all library-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new client for the given server
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Home Endpoint
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Library Endpoints
    // ========================================================================

    /// GET /library/all
    ///
    /// `query` carries filter and pagination parameters, e.g.
    /// `&[("author", "Muse"), ("limit", "1")]`.
    pub async fn get_all_songs(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/library/all", self.base_url))
            .query(query)
            .send()
            .await
            .expect("List request failed")
    }

    /// GET /library/text
    ///
    /// `query` carries the song identity and the optional verse selector,
    /// e.g. `&[("author", "Muse"), ("song", "Uprising"), ("verse", "2")]`.
    pub async fn get_song_text(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/library/text", self.base_url))
            .query(query)
            .send()
            .await
            .expect("Text request failed")
    }

    /// DELETE /library/delete
    pub async fn delete_song(&self, author: &str, title: &str) -> Response {
        self.client
            .delete(format!("{}/library/delete", self.base_url))
            .query(&[("author", author), ("song", title)])
            .send()
            .await
            .expect("Delete request failed")
    }

    /// POST /library/add
    pub async fn add_song(&self, body: serde_json::Value) -> Response {
        self.client
            .post(format!("{}/library/add", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Add request failed")
    }

    /// POST /library/add with a raw body, for malformed payload tests
    pub async fn add_song_raw(&self, body: &str) -> Response {
        self.client
            .post(format!("{}/library/add", self.base_url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Add request failed")
    }

    /// PUT /library/update
    pub async fn update_song(
        &self,
        author: &str,
        title: &str,
        body: serde_json::Value,
    ) -> Response {
        self.client
            .put(format!("{}/library/update", self.base_url))
            .query(&[("author", author), ("song", title)])
            .json(&body)
            .send()
            .await
            .expect("Update request failed")
    }

    /// PUT /library/update with a raw body, for malformed payload tests
    pub async fn update_song_raw(&self, author: &str, title: &str, body: &str) -> Response {
        self.client
            .put(format!("{}/library/update", self.base_url))
            .query(&[("author", author), ("song", title)])
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Update request failed")
    }
}
