use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use jmxport_observability::{init_tracing, LogFormat};
use jmxport_server::{create_router, AppState, ServerConfig};

/// Serve JMX-style attributes as Prometheus metrics
#[derive(Parser, Debug)]
#[command(name = "jmxport-server", version, about)]
struct Args {
    /// Config file (defaults to ./jmxport.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log output format: pretty, compact or json
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    /// Log filter directive, overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format, args.log_level.as_deref())
        .context("Failed to initialise logging")?;

    let config = ServerConfig::load(args.config.as_deref())?;
    tracing::info!("Server configuration: {:?}", config);

    let state = AppState::from_config(&config)?;
    if !state.is_auth_enabled() {
        tracing::warn!("Authentication is disabled");
    }
    let app = create_router(Arc::new(state));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!(
        "jmxport listening on http://{}{}",
        bind_addr,
        config.metrics_path
    );

    axum::serve(listener, app)
        .await
        .context("Server error")?;
    Ok(())
}
