//! Scripted stand-in for the external song info service
//!
//! Each spawned instance owns a queue of replies and serves them in order,
//! one per request, while recording how it was called. This is what the
//! server under test probes when a song is added.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// One scripted answer from the mock song info service
#[derive(Clone)]
pub enum ScriptedReply {
    /// Respond 200 with this JSON body
    Detail(serde_json::Value),
    /// Respond with a bare status code
    Status(u16),
}

#[derive(Clone)]
struct MockState {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<HashMap<String, String>>>>,
}

/// A running mock song info server on an ephemeral port
///
/// When dropped, the server gracefully shuts down.
pub struct MockSongInfo {
    /// Base URL to hand to the server under test
    pub base_url: String,

    state: MockState,
    shutdown: Option<oneshot::Sender<()>>,
}

async fn serve_scripted(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_query.lock().unwrap() = Some(params);

    let reply = state.replies.lock().unwrap().pop_front();
    match reply {
        Some(ScriptedReply::Detail(body)) => Json(body).into_response(),
        Some(ScriptedReply::Status(code)) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        // An exhausted script means the test scripted too few replies
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

impl MockSongInfo {
    /// Spawns the mock with the given reply script
    pub async fn spawn(replies: Vec<ScriptedReply>) -> Self {
        let state = MockState {
            replies: Arc::new(Mutex::new(replies.into())),
            hits: Arc::new(AtomicUsize::new(0)),
            last_query: Arc::new(Mutex::new(None)),
        };

        let app = Router::new()
            .route("/", get(serve_scripted))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock song info server");
        let addr = listener
            .local_addr()
            .expect("Failed to get mock server address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock song info server failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Number of requests received so far
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Query parameters of the most recent request, if any arrived
    pub fn last_query(&self) -> Option<HashMap<String, String>> {
        self.state.last_query.lock().unwrap().clone()
    }
}

impl Drop for MockSongInfo {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
