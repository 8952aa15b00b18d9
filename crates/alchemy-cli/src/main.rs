use std::path::{Path, PathBuf};
use std::sync::Arc;

use alchemy_application::FusionService;
use alchemy_core::config::AlchemyConfig;
use alchemy_interaction::GeminiFusionClient;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(name = "emoji-alchemy")]
#[command(about = "Emoji Alchemy - fuse two symbols into an invented creation", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in symbols with their numbers
    Catalog,
    /// Fuse two symbols once (a symbol or a catalog number each)
    Fuse {
        first: String,
        second: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Fail instead of showing the fallback result
        #[arg(long)]
        strict: bool,
    },
    /// Start an interactive alchemy session
    Play,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog => commands::catalog::run(),
        Commands::Fuse {
            first,
            second,
            json,
            strict,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let service = build_service(&config)?;
            commands::fuse::run(&service, &first, &second, json, strict).await
        }
        Commands::Play => {
            let config = load_config(cli.config.as_deref())?;
            let service = build_service(&config)?;
            commands::play::run(service, config.session).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AlchemyConfig> {
    let mut config = AlchemyConfig::load(path).context("Failed to load configuration")?;
    config.apply_env();
    tracing::debug!(model = %config.gemini.model, "Configuration loaded");
    Ok(config)
}

/// Composition root: the provider client is built here and handed down.
fn build_service(config: &AlchemyConfig) -> Result<Arc<FusionService>> {
    let client = GeminiFusionClient::try_from_env(&config.gemini)
        .context("Failed to create Gemini client")?;
    tracing::info!(model = client.model(), "Gemini client ready");
    Ok(Arc::new(FusionService::new(Arc::new(client))))
}
