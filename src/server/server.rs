use anyhow::Result;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, error, info};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::library_store::{PageWindow, SongDetail, SongFilter};
use crate::service::{LibraryError, LibraryService};

use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct ListParams {
    #[serde(default)]
    author: String,
    #[serde(default)]
    song: String,
    #[serde(default, rename = "releaseDate")]
    release_date: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    link: String,
    offset: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TextParams {
    #[serde(default)]
    author: String,
    #[serde(default)]
    song: String,
    verse: Option<String>,
}

#[derive(Deserialize, Debug)]
struct IdentityParams {
    #[serde(default)]
    author: String,
    #[serde(default)]
    song: String,
}

#[derive(Deserialize, Debug)]
struct AddSongBody {
    #[serde(default)]
    group: String,
    #[serde(default)]
    song: String,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: format!("{}-{}", env!("CARGO_PKG_VERSION"), state.hash),
    };
    Json(stats)
}

async fn list_library(
    State(library): State<GuardedLibraryService>,
    Query(params): Query<ListParams>,
) -> Response {
    let filter = SongFilter {
        author: params.author,
        title: params.song,
        release_date: params.release_date,
        text: params.text,
        link: params.link,
    };
    let window = PageWindow {
        offset: params.offset,
        limit: params.limit,
    };
    match library.list(&filter, &window) {
        Ok(songs) if songs.is_empty() => StatusCode::NOT_FOUND.into_response(),
        Ok(songs) => Json(songs).into_response(),
        Err(err) => error_response(err),
    }
}

async fn song_text(
    State(library): State<GuardedLibraryService>,
    Query(params): Query<TextParams>,
) -> Response {
    match library.song_text(&params.author, &params.song, params.verse.as_deref()) {
        Ok(text) => text.into_response(),
        Err(err) => error_response(err),
    }
}

async fn delete_song(
    State(library): State<GuardedLibraryService>,
    Query(params): Query<IdentityParams>,
) -> Response {
    match library.delete(&params.author, &params.song) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => error_response(err),
    }
}

async fn add_song(State(library): State<GuardedLibraryService>, body: Bytes) -> Response {
    // Deserialized by hand so a malformed body is a 400, not axum's 422
    let body: AddSongBody = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(err) => {
            debug!("Malformed add body: {}", err);
            return (
                StatusCode::BAD_REQUEST,
                format!("malformed request body: {}", err),
            )
                .into_response();
        }
    };
    match library.create(&body.group, &body.song).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(err) => error_response(err),
    }
}

async fn update_song(
    State(library): State<GuardedLibraryService>,
    Query(params): Query<IdentityParams>,
    body: Bytes,
) -> Response {
    let detail: SongDetail = match serde_json::from_slice(&body) {
        Ok(detail) => detail,
        Err(err) => {
            debug!("Malformed update body: {}", err);
            return (
                StatusCode::BAD_REQUEST,
                format!("malformed request body: {}", err),
            )
                .into_response();
        }
    };
    match library.update(&params.author, &params.song, detail) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => error_response(err),
    }
}

/// One place for the error-to-status mapping, so every route answers the
/// same failure the same way. 404s are deliberately bare.
fn error_response(err: LibraryError) -> Response {
    match err {
        LibraryError::MissingIdentity
        | LibraryError::MalformedPagination { .. }
        | LibraryError::InvalidVerseIndex(_)
        | LibraryError::UpstreamBadRequest => {
            debug!("Bad request: {}", err);
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        LibraryError::NotFound => StatusCode::NOT_FOUND.into_response(),
        LibraryError::Conflict => (StatusCode::CONFLICT, err.to_string()).into_response(),
        LibraryError::UpstreamUnexpected(code) => {
            error!("External api returned unsupported status {}", code);
            match StatusCode::from_u16(code) {
                Ok(status) => status.into_response(),
                Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            }
        }
        LibraryError::UpstreamUnavailable
        | LibraryError::UpstreamTransport(_)
        | LibraryError::StoreFailure(_) => {
            error!("Request failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

impl ServerState {
    fn new(config: ServerConfig, library: GuardedLibraryService) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            library,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(config: ServerConfig, library: Arc<LibraryService>) -> Result<Router> {
    let state = ServerState::new(config, library);

    let library_routes: Router = Router::new()
        .route("/all", get(list_library))
        .route("/text", get(song_text))
        .route("/delete", delete(delete_song))
        .route("/add", post(add_song))
        .route("/update", put(update_song))
        .with_state(state.clone());

    let home_router: Router = Router::new().route("/", get(home)).with_state(state.clone());

    let app = home_router
        .nest("/library", library_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    library: Arc<LibraryService>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
    };
    let app = make_app(config, library)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    info!("Listening on http://127.0.0.1:{}", port);

    Ok(axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(err) => {
            error!("Failed to install Ctrl-C handler: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
