use std::path::PathBuf;

use anyhow::{Context, Result};
use chirp_common::observability::{LogConfig, LogFormat, init_logging};
use chirp_config::{ChirpConfig, ChirpConfigLoader, LoggingSettings, default_config_path};
use chirp_twitter::{ApiConfig, TwitterApi};
use clap::Parser;
use commands::Command;
use secrecy::ExposeSecret;
mod commands;

#[derive(Debug, Parser)]
#[command(name = "chirp", version, about = "Command-line client for the Twitter REST API")]
struct Opts {
    /// Configuration file; defaults to the platform config dir.
    #[arg(long, short, env = "CHIRP_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    // 1) Load config (env wins)
    let cfg = load_config(opts.config.as_deref())?;

    let log_path = init_logging(log_config(&cfg.logging))?;
    tracing::debug!(log_path = %log_path.display(), version = ?cfg.version, "chirp.start");

    let api = TwitterApi::new(api_config(&cfg)).context("failed to build Twitter client")?;
    commands::run(&api, opts.command).await
}

fn load_config(path: Option<&std::path::Path>) -> Result<ChirpConfig> {
    let loader = ChirpConfigLoader::new();
    let loader = match (path, default_config_path()) {
        (Some(path), _) => loader.with_file(path),
        (None, Some(default)) => loader.with_optional_file(default),
        (None, None) => loader,
    };
    loader.load().context("failed to load chirp configuration")
}

fn api_config(cfg: &ChirpConfig) -> ApiConfig {
    let twitter = &cfg.twitter;
    let mut api = ApiConfig::new(
        twitter.consumer_key.clone(),
        twitter.consumer_secret.expose_secret().clone(),
    )
    .with_api_base(twitter.api_base.clone());
    if let (Some(token), Some(secret)) = (&twitter.access_token, &twitter.access_token_secret) {
        api = api.with_access_token(token.clone(), secret.expose_secret().clone());
    }
    api
}

fn log_config(logging: &LoggingSettings) -> LogConfig {
    LogConfig {
        app_name: "chirp",
        log_dir: logging.dir.clone(),
        emit_stderr: logging.emit_stderr,
        format: match logging.format {
            chirp_config::LogFormat::Text => LogFormat::Text,
            chirp_config::LogFormat::Json => LogFormat::Json,
        },
        default_filter: logging.filter.clone().into(),
    }
}
