use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use music_library_server::config::{AppConfig, CliConfig, FileConfig};
use music_library_server::enrichment::{BackoffSchedule, Enricher, HttpSongInfoClient};
use music_library_server::library_store::{SchemaResetPolicy, SqliteLibraryStore};
use music_library_server::server::{run_server, RequestsLoggingLevel};
use music_library_server::service::LibraryService;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite library database file.
    #[clap(value_parser = parse_path)]
    pub library_db: Option<PathBuf>,

    /// Path to a TOML config file; its values override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the external song info service.
    #[clap(long)]
    pub song_info_url: Option<String>,

    /// Timeout in seconds for song info requests.
    #[clap(long, default_value_t = 30)]
    pub song_info_timeout_sec: u64,

    /// What to do when the stored schema does not match the expected version.
    #[clap(long, default_value = "wipe-and-recreate")]
    pub schema_policy: SchemaResetPolicy,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };

    let cli_config = CliConfig {
        db_path: cli_args.library_db.clone(),
        port: cli_args.port,
        logging_level: cli_args.logging_level.clone(),
        song_info_url: cli_args.song_info_url.clone(),
        song_info_timeout_sec: cli_args.song_info_timeout_sec,
        schema_policy: cli_args.schema_policy,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening SQLite library database at {:?}...", config.db_path);
    let store = Arc::new(SqliteLibraryStore::new(
        &config.db_path,
        config.schema_policy,
    )?);

    info!("Song info service configured at {}", config.song_info_url);
    let song_info = Arc::new(HttpSongInfoClient::new(
        config.song_info_url.clone(),
        config.song_info_timeout_sec,
    ));

    let schedule = BackoffSchedule {
        initial_delay: Duration::from_secs(config.enrichment.initial_backoff_secs),
        max_delay: Duration::from_secs(config.enrichment.max_backoff_secs),
    };
    let enricher = Enricher::new(song_info, schedule, config.enrichment.max_attempts);
    let library = Arc::new(LibraryService::new(store, enricher));

    info!("Ready to serve at port {}!", config.port);
    run_server(library, config.logging_level, config.port).await
}
