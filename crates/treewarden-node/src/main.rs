//! Treewarden Node — entry point.
//!
//! Starts the edge-leasing coordinator with configuration from a TOML file or
//! defaults, and serves the HTTP API until interrupted.

mod api;
mod config;
mod state;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use treewarden_core::NetworkManager;

use config::{LoggingConfig, TreewardenConfig};
use state::AppState;

/// Treewarden Node
#[derive(Parser, Debug)]
#[command(name = "treewarden-node", version, about = "Treewarden loop-free edge coordinator")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "treewarden.toml")]
    config: PathBuf,

    /// Override the API listen address.
    #[arg(long)]
    listen_addr: Option<String>,

    /// Override the API port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the number of node ids per graph.
    #[arg(long)]
    max_nodes: Option<usize>,

    /// Override the lease duration, in seconds.
    #[arg(long)]
    lease_secs: Option<u64>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = TreewardenConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(listen_addr) = args.listen_addr {
        config.api.listen_addr = listen_addr;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(max_nodes) = args.max_nodes {
        config.lease.max_nodes = max_nodes;
    }
    if let Some(lease_secs) = args.lease_secs {
        config.lease.lease_duration = Duration::from_secs(lease_secs);
    }
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    init_tracing(&config.logging);

    // Handle --init flag
    if args.init {
        let defaults = TreewardenConfig::default();
        defaults.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    config.validate()?;
    let listen_addr = config.api_socket_addr()?;

    tracing::info!("Treewarden Node v{}", env!("CARGO_PKG_VERSION"));

    let networks = NetworkManager::new(config.lease.clone())?;
    let state = Arc::new(AppState::new(networks));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
        tracing::info!("received shutdown signal");
    };

    tokio::select! {
        result = api::start_api_server(listen_addr, state) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP API server error");
                return Err(e);
            }
        }
        _ = shutdown => {
            tracing::info!("initiating graceful shutdown");
        }
    }

    tracing::info!("Treewarden node exited cleanly");
    Ok(())
}
