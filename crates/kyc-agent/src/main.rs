//! # kyc-agent: Binary Entry Point
//!
//! Loads configuration from the environment, wires the upstream clients and
//! serves the agent on `0.0.0.0:$PORT` (default 3000).

use kyc_agent::state::{AppConfig, AppState};
use kyc_providers::ProviderConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Agent configuration invalid: {e}");
        e
    })?;
    let providers = ProviderConfig::from_env().map_err(|e| {
        tracing::error!("Upstream configuration invalid: {e}");
        e
    })?;
    tracing::info!(?providers, "upstream services configured");
    if providers.proof_verifier.is_none() {
        tracing::warn!("PROOF_VERIFIER_URL not set; ZK envelopes will be rejected");
    }
    if config.development {
        tracing::warn!("ENV=development: all message types accepted as plain JSON");
    }

    let port = config.port;
    let state = AppState::from_providers(config, providers).map_err(|e| {
        tracing::error!("Failed to create upstream clients: {e}");
        e
    })?;
    let app = kyc_agent::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("KYC agent listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Structured logging; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}
