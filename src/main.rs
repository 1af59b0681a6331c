//! RESTful resource server.
//!
//! Serves every `[[resources]]` entry of the config file as an in-memory
//! key-value resource.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ routing ──▶ resource adapter ──▶ Model
//!                     (request id,    (mount,     (negotiate, method,   (get, put,
//!                      limits,         segment)    decode, gate)         post, ...)
//!                      timeout)
//!     Client Response                                  │
//!     ◀──────────────────────────── response ◀─────────┘
//!                                   (status, headers, streamed JSON array)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use rest_resource::config::{load_config, ServerConfig};
use rest_resource::lifecycle::{build_server, shutdown_signal, Shutdown};
use rest_resource::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "rest-resource")]
#[command(about = "Serve key-value resources over a RESTful HTTP interface", long_about = None)]
struct Args {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("rest-resource v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        resources = config.resources.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let server = build_server(config)?;

    let shutdown = Shutdown::new();
    let stopped = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, stopped).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
