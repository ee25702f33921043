use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Parser;
use harbor_watch_core::{telemetry, Config, DirectInferenceAdapter};
use harbor_watch_proxy::{build_router, AppState};

#[derive(Parser)]
#[command(name = "harbor-watch-proxy")]
#[command(about = "Serve /api/chat for the Harbor Watch dashboard")]
struct Cli {
    /// Path to config.json (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8787
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_stderr_logging()?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let api_key = config.api_key().ok_or_else(|| {
        anyhow!("No inference API key. Set HARBOR_WATCH_API_KEY or api_key in config.json")
    })?;
    let upstream = DirectInferenceAdapter::new(config.inference_url(), &api_key, config.model());
    tracing::info!(
        endpoint = upstream.endpoint(),
        model = upstream.model(),
        "upstream inference configured"
    );

    let app = build_router(AppState::new(Arc::new(upstream)));

    let bind = cli.bind.as_deref().unwrap_or_else(|| config.proxy_bind());
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow!("Failed to bind {}: {}", bind, e))?;
    tracing::info!(addr = %listener.local_addr()?, "harbor-watch-proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("harbor-watch-proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
