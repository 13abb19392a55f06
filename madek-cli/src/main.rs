//! madek - Compile Madek collections and media entries into JSON
//!
//! `madek fetch <id>` prints one compiled document to stdout;
//! `madek server` serves compiled documents over HTTP.

use anyhow::Result;
use clap::{Parser, Subcommand};
use madek_common::config::{load_toml_config, CliOverrides, Settings};
use madek_cli::{build_client, build_router, AppState};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "madek", version, about = "Compile Madek media-archive resources into JSON")]
struct Cli {
    /// Configuration file (default: ~/.config/madek/config.toml, then /etc/madek/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Madek API base address
    #[arg(long, global = true)]
    address: Option<String>,

    /// API username for basic authentication
    #[arg(long, global = true)]
    username: Option<String>,

    /// API password for basic authentication
    #[arg(long, global = true)]
    password: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile one resource and print it as JSON
    Fetch {
        /// Collection id (or media-entry id with --media-entry)
        id: String,

        /// Compile a media entry instead of a collection
        #[arg(long)]
        media_entry: bool,

        /// Print compact instead of pretty JSON
        #[arg(long)]
        compact: bool,
    },

    /// Run the HTTP server
    Server {
        /// Listen address
        #[arg(long)]
        bind: Option<String>,

        /// Keep compiled responses in memory
        #[arg(long)]
        cache: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        address: cli.address.clone(),
        username: cli.username.clone(),
        password: cli.password.clone(),
        bind: match &cli.command {
            Command::Server { bind, .. } => bind.clone(),
            Command::Fetch { .. } => None,
        },
        log_level: cli.log_level.clone(),
        cache: matches!(cli.command, Command::Server { cache: true, .. }),
    };
    let toml_config = load_toml_config(cli.config.as_deref())?;
    let settings = Settings::resolve(&overrides, &toml_config)?;

    // RUST_LOG wins over the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&settings.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    info!(
        "Starting madek v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Madek API: {}", settings.address);

    let client = build_client(&settings)?;

    match cli.command {
        Command::Fetch {
            id,
            media_entry,
            compact,
        } => {
            let document = if media_entry {
                client.compile_media_entry(&id).await.map(serde_json::to_value)
            } else {
                client.compile_collection(&id).await.map(serde_json::to_value)
            };

            let document = match document {
                Ok(document) => document?,
                Err(e) => {
                    error!("Failed to compile {}: {}", id, e);
                    return Err(e.into());
                }
            };

            let output = if compact {
                serde_json::to_string(&document)?
            } else {
                serde_json::to_string_pretty(&document)?
            };
            println!("{}", output);
        }
        Command::Server { .. } => {
            let state = AppState::new(client, settings.cache);
            let app = build_router(state);

            let listener = tokio::net::TcpListener::bind(&settings.bind).await?;
            info!("madek listening on http://{}", settings.bind);
            info!("Health check: http://{}/health", settings.bind);
            if settings.cache {
                info!("Response cache enabled");
            }

            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
