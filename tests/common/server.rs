//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own library database.

use super::constants::*;
use super::fixtures::{create_empty_library, create_seeded_library};
use music_library_server::enrichment::{BackoffSchedule, Enricher, HttpSongInfoClient};
use music_library_server::library_store::{SchemaResetPolicy, SqliteLibraryStore};
use music_library_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use music_library_server::service::LibraryService;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Placeholder upstream for tests that never enrich. Port 9 is the discard
/// port, nothing listens there.
const UNREACHABLE_SONG_INFO_URL: &str = "http://127.0.0.1:9";

/// Test server instance with an isolated library database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server over the seeded library on a random port
    ///
    /// The song info upstream points at a closed port, so tests using this
    /// must not exercise the add flow (or must expect it to fail).
    pub async fn spawn() -> Self {
        let (temp_dir, db_path) =
            create_seeded_library().expect("Failed to create seeded library");
        Self::start(temp_dir, &db_path, UNREACHABLE_SONG_INFO_URL).await
    }

    /// Spawns a new test server over an empty library
    pub async fn spawn_empty() -> Self {
        let (temp_dir, db_path) = create_empty_library().expect("Failed to create empty library");
        Self::start(temp_dir, &db_path, UNREACHABLE_SONG_INFO_URL).await
    }

    /// Spawns a new test server over the seeded library, probing the given
    /// song info URL on add
    pub async fn spawn_with_song_info_url(song_info_url: &str) -> Self {
        let (temp_dir, db_path) =
            create_seeded_library().expect("Failed to create seeded library");
        Self::start(temp_dir, &db_path, song_info_url).await
    }

    async fn start(temp_dir: TempDir, db_path: &Path, song_info_url: &str) -> Self {
        // The fixture just created a matching schema, nothing gets wiped here
        let store = Arc::new(
            SqliteLibraryStore::new(db_path, SchemaResetPolicy::FailOnMismatch)
                .expect("Failed to open library store"),
        );

        let api = Arc::new(HttpSongInfoClient::new(
            song_info_url.to_string(),
            REQUEST_TIMEOUT_SECS,
        ));
        let schedule = BackoffSchedule {
            initial_delay: Duration::from_millis(ENRICHMENT_INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(ENRICHMENT_MAX_BACKOFF_MS),
        };
        let enricher = Enricher::new(api, schedule, ENRICHMENT_MAX_ATTEMPTS);
        let library = Arc::new(LibraryService::new(store, enricher));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        // Build the app
        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
        };
        let app = make_app(config, library).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    // Server is ready
                    return;
                }
                _ => {
                    // Server not ready yet, wait and retry
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
