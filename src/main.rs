//! Attack-log server.
//!
//! An intentionally vulnerable web app that records every request it
//! receives, flags SQL-injection attempts, and can re-issue a
//! caller-described request to any host.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http::server ──▶ http::request (capture)
//!                                           │
//!                                           ├─▶ capture::record ──▶ capture::detector
//!                                           └─▶ capture::store (requests / attacks)
//!                                           │
//!                                           ▼
//!                                     http::handlers ──▶ forward::client ──▶ Target
//!     ◀─────────────── JSON / HTML ◀────────┘
//!
//!     config (TOML, watcher, SIGHUP) · observability (tracing, metrics) · lifecycle
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use attack_log_server::config::{self, AppConfig, ConfigWatcher, ServerMode};
use attack_log_server::lifecycle::{signals, Shutdown};
use attack_log_server::observability;
use attack_log_server::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "attack-log-server", version)]
#[command(about = "Capture, classify and forward inbound HTTP requests", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long, env = "ATTACK_LOG_BIND")]
    bind: Option<String>,

    /// Override the server posture.
    #[arg(short, long, value_enum)]
    mode: Option<ServerMode>,

    /// Reload the [forward] section when the config file changes.
    #[arg(short, long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    observability::init_logging(&config.observability)?;

    tracing::info!("attack-log-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mode = config.mode.as_str(),
        request_capacity = config.logs.request_capacity,
        attack_capacity = config.logs.attack_capacity,
        forward_timeout_ms = config.forward.timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    // Keep the watcher alive for the lifetime of the server.
    let mut _watcher = None;
    let config_updates = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            tokio::spawn(signals::reload_on_hangup(
                path.clone(),
                watcher.sender(),
                shutdown.subscribe(),
            ));
            if args.watch {
                _watcher = Some(watcher.run()?);
            }
            updates
        }
        None => mpsc::unbounded_channel().1,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
