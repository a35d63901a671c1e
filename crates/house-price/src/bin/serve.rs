//! Serve the prediction form on `http://127.0.0.1:8501`.
//!
//! Loads `house_model.pkl` from the working directory on first request.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use house_price::serving::{router, AppState, ServeConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("house_price=info".parse()?))
        .init();

    let config = ServeConfig::default();
    let state = AppState::from_config(&config);

    // Load eagerly so a missing artifact is reported at startup; the app
    // keeps retrying on each request.
    if let Err(e) = state.cache.get_or_load() {
        warn!(error = %e, "starting without a model, run the trainer first");
    }

    let listener = tokio::net::TcpListener::bind(config.address)
        .await
        .with_context(|| format!("failed to bind {}", config.address))?;
    info!(address = %config.address, "serving house price form");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
