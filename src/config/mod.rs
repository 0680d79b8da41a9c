mod file_config;

pub use file_config::{EnrichmentConfig, FileConfig};

use crate::library_store::SchemaResetPolicy;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub song_info_url: Option<String>,
    pub song_info_timeout_sec: u64,
    pub schema_policy: SchemaResetPolicy,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub song_info_url: String,
    pub song_info_timeout_sec: u64,
    pub schema_policy: SchemaResetPolicy,
    pub enrichment: EnrichmentSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified as an argument or in config file")
            })?;

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }
        if db_path.is_dir() {
            bail!("db_path is a directory, expected a file path: {:?}", db_path);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let song_info_url = file
            .song_info_url
            .or_else(|| cli.song_info_url.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "song_info_url must be specified via --song-info-url or in config file"
                )
            })?;

        let song_info_timeout_sec = file
            .song_info_timeout_sec
            .unwrap_or(cli.song_info_timeout_sec);

        let schema_policy = file
            .schema_policy
            .and_then(|s| parse_schema_policy(&s))
            .unwrap_or(cli.schema_policy);

        // Enrichment settings - merge file config with defaults
        let enrichment_file = file.enrichment.unwrap_or_default();
        let enrichment = EnrichmentSettings {
            max_attempts: enrichment_file.max_attempts.unwrap_or(5),
            initial_backoff_secs: enrichment_file.initial_backoff_secs.unwrap_or(1),
            max_backoff_secs: enrichment_file.max_backoff_secs.unwrap_or(10),
        };

        Ok(Self {
            db_path,
            port,
            logging_level,
            song_info_url,
            song_info_timeout_sec,
            schema_policy,
            enrichment,
        })
    }
}

#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    pub max_attempts: u32,
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_secs: 1,
            max_backoff_secs: 10,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

fn parse_schema_policy(s: &str) -> Option<SchemaResetPolicy> {
    SchemaResetPolicy::from_str(s, true).ok()
}
