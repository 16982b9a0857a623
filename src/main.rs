//! V2Ray user management API.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 USER API SHIM                │
//!                     │                                              │
//!   GET /add-user     │  ┌─────────┐    ┌──────────┐    ┌─────────┐  │     gRPC     ┌───────────────┐
//!   GET /...-traffic ─┼─▶│  http   │───▶│ handlers │───▶│upstream │──┼─────────────▶│ V2Ray API     │
//!                     │  │ server  │    │ validate │    │ client  │  │ AlterInbound │ 127.0.0.1:    │
//!   status / JSON   ◀─┼──│         │◀───│ + map    │◀───│ (1 call)│◀─┼──────────────│ 10085         │
//!                     │  └─────────┘    └──────────┘    └─────────┘  │  QueryStats  └───────────────┘
//!                     │                                              │
//!                     │  config (TOML, hot reload) · observability   │
//!                     │  lifecycle (signals, graceful shutdown)      │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use v2ray_user_api::config::{load_config, ConfigWatcher, ShimConfig};
use v2ray_user_api::lifecycle::{signals, Shutdown};
use v2ray_user_api::observability::{logging, metrics};
use v2ray_user_api::HttpServer;

#[derive(Parser)]
#[command(name = "v2ray-user-api")]
#[command(about = "HTTP API for managing V2Ray users and traffic counters", long_about = None)]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload upstream settings when the configuration file changes
    #[arg(short, long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ShimConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!("v2ray-user-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.endpoint_uri(),
        inbound_tag = %config.upstream.inbound_tag,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            (Some(watcher.run()?), updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
