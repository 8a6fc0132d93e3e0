use anyhow::Context;
use autobank_gateway::config;
use autobank_gateway::server::{app, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up BASE_URL_MBBANKING_API, IDENTITY_REFRESH_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config().clone();
    tracing::info!("Starting AutoBank gateway in {:?} mode", config.environment);
    tracing::info!("Banking API: {}", config.relay.banking_base_url);
    tracing::info!("Cars API: {}", config.relay.car_base_url);

    let port = config.api.port;
    let state = AppState::from_config(config).context("invalid relay configuration")?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("AutoBank gateway listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server")?;
    Ok(())
}
