use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

mod api;
mod config;
mod middleware;

use config::{AppState, Credentials, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "tollgate")]
#[command(about = "Authenticated MCP tool gateway", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "tollgate.toml")]
    config: PathBuf,

    /// Host to bind to (overrides the config file)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Shared secret callers present as a bearer token
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Identity returned by the validate tool
    #[arg(long, env = "MY_NUMBER")]
    identity: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Values from .env become visible to clap's env fallbacks and RUST_LOG
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tollgate=info,tollgate_mcp=info,tower_http=info".into()),
        )
        .with_target(false)
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let args = Args::parse();

    let mut config = ServerConfig::load(&args.config)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let credentials = Credentials::from_values(args.auth_token, args.identity)
        .context("Missing startup credentials")?;
    let state = AppState::new(&config, credentials)?;

    tracing::info!("Starting Tollgate MCP gateway");
    api::serve(&config, state).await?;

    Ok(())
}
